//! Course completion derivation.
//!
//! Completion is a pure set comparison: a course is complete for a
//! student when the set of completed lesson IDs covers the set of lessons
//! the course currently contains. Progress rows for lessons that were
//! later removed from the course (orphans) are excluded before counting,
//! so a shrunken course can never appear "more than complete".

use std::collections::BTreeSet;

use coursekit_types::{CourseCompletion, LessonId};

/// Derive a student's completion state for one course.
///
/// `course_lessons` is the set of lesson IDs the course currently holds;
/// `completed` is the set of lesson IDs the student has completed
/// (possibly including orphans from deleted lessons). The result scopes
/// the completed set to the course before comparing counts.
///
/// A course with no lessons is vacuously complete (0 of 0), matching the
/// count comparison the classroom view performs.
pub fn course_completion(
    course_lessons: &BTreeSet<LessonId>,
    completed: &BTreeSet<LessonId>,
) -> CourseCompletion {
    let completed_lesson_ids: BTreeSet<LessonId> =
        completed.intersection(course_lessons).copied().collect();
    let all_completed = completed_lesson_ids.len() == course_lessons.len();
    CourseCompletion {
        total_lessons: u64::try_from(course_lessons.len()).unwrap_or(u64::MAX),
        completed_lesson_ids,
        all_completed,
    }
}

/// Whether a completion state earns a certificate.
///
/// Requires every lesson completed *and* at least one lesson to exist:
/// an empty course is vacuously complete but never mints a certificate.
pub const fn certificate_eligible(completion: &CourseCompletion) -> bool {
    completion.all_completed && completion.total_lessons > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<LessonId> {
        (0..n).map(|_| LessonId::new()).collect()
    }

    #[test]
    fn complete_when_sets_match() {
        let lessons = ids(3);
        let course: BTreeSet<LessonId> = lessons.iter().copied().collect();
        let done: BTreeSet<LessonId> = lessons.iter().copied().collect();

        let completion = course_completion(&course, &done);
        assert!(completion.all_completed);
        assert_eq!(completion.total_lessons, 3);
        assert_eq!(completion.completed_lesson_ids.len(), 3);
        assert!(certificate_eligible(&completion));
    }

    #[test]
    fn incomplete_when_a_lesson_is_missing() {
        let lessons = ids(3);
        let course: BTreeSet<LessonId> = lessons.iter().copied().collect();
        let done: BTreeSet<LessonId> = lessons.iter().take(2).copied().collect();

        let completion = course_completion(&course, &done);
        assert!(!completion.all_completed);
        assert_eq!(completion.completed_lesson_ids.len(), 2);
    }

    #[test]
    fn orphaned_progress_rows_do_not_inflate_the_count() {
        let lessons = ids(2);
        let course: BTreeSet<LessonId> = lessons.iter().copied().collect();

        // The student completed one current lesson plus two lessons that
        // were since removed from the course.
        let mut done: BTreeSet<LessonId> = lessons.iter().take(1).copied().collect();
        done.extend(ids(2));

        let completion = course_completion(&course, &done);
        assert!(!completion.all_completed);
        assert_eq!(completion.completed_lesson_ids.len(), 1);
        assert_eq!(completion.total_lessons, 2);
    }

    #[test]
    fn empty_course_is_vacuously_complete_but_earns_no_certificate() {
        let course = BTreeSet::new();
        let done: BTreeSet<LessonId> = ids(1).into_iter().collect();

        let completion = course_completion(&course, &done);
        assert!(completion.all_completed);
        assert_eq!(completion.total_lessons, 0);
        assert!(!certificate_eligible(&completion));
    }
}
