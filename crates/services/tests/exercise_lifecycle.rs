use std::collections::HashSet;
use std::rc::Rc;

use chrono::Duration;
use mathplay_core::model::{
    ExerciseId, ExerciseSettings, FeedbackKind, FeedbackMessages, RetryPolicy,
};
use mathplay_core::time::{fixed_clock, fixed_now};
use mathplay_core::verify::parse_number;
use mathplay_core::{AttemptError, AttemptState};
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{
    ExerciseContent, ExerciseError, HostSurface, KeyOutcome, KeyToken, RecordingHost, Submission,
};

type Sum = (i32, i32);

fn sums() -> Vec<Sum> {
    vec![(2, 3), (4, 4), (6, 1)]
}

fn answer(challenge: &Sum) -> i32 {
    challenge.0 + challenge.1
}

fn exercise(host: &Rc<RecordingHost>, seed: u64) -> ExerciseContent<Sum, i32> {
    let shared: Rc<dyn HostSurface> = host.clone();
    ExerciseContent::new(
        ExerciseId::new("sumas"),
        shared,
        |challenge: &Sum, given: &i32| answer(challenge) == *given,
        StdRng::seed_from_u64(seed),
    )
    .with_clock(fixed_clock())
}

fn text_exercise(host: &Rc<RecordingHost>, seed: u64) -> ExerciseContent<Sum, i32> {
    exercise(host, seed)
        .with_text_input(|_: &Sum, raw: &str| parse_number(raw).map(|value| value as i32))
}

fn keypad_exercise(host: &Rc<RecordingHost>) -> ExerciseContent<Sum, i32> {
    exercise(host, 5).with_keypad(|_: &Sum, raw: &str| parse_number(raw).map(|value| value as i32))
}

#[test]
fn wrong_answer_reopens_after_the_retry_delay() {
    let host = Rc::new(RecordingHost::new());
    let mut exercise = exercise(&host, 1);
    exercise.mount(sums(), host.signal());
    let wrong = answer(exercise.challenge().unwrap()) + 1;

    exercise.select(wrong).unwrap();
    let verdict = exercise.verify().unwrap();
    let due = fixed_now() + Duration::milliseconds(1500);
    assert_eq!(verdict.retry_at, Some(due));
    assert_eq!(exercise.next_deadline(), Some(due));
    assert_eq!(
        host.current_feedback().map(|feedback| feedback.kind),
        Some(FeedbackKind::Incorrect)
    );

    assert!(!exercise.tick(fixed_now()));
    assert!(!exercise.tick(due - Duration::milliseconds(1)));
    assert_eq!(exercise.state(), AttemptState::VerifiedIncorrect);

    assert!(exercise.tick(due));
    assert_eq!(exercise.state(), AttemptState::Selected);
    assert_eq!(exercise.attempt().selection(), Some(&wrong));
    assert_eq!(exercise.next_deadline(), None);
    assert_eq!(
        host.current_feedback().map(|feedback| feedback.kind),
        Some(FeedbackKind::Incorrect)
    );

    exercise.select(wrong - 1).unwrap();
    assert_eq!(host.current_feedback(), None);
}

#[test]
fn advancing_drops_the_pending_retry() {
    let host = Rc::new(RecordingHost::new());
    let mut exercise = exercise(&host, 2);
    exercise.mount(sums(), host.signal());
    exercise.select(-1).unwrap();
    let verdict = exercise.verify().unwrap();
    let due = verdict.retry_at.unwrap();

    host.advance();
    assert!(exercise.update(host.signal()));
    assert_eq!(exercise.next_deadline(), None);
    assert!(!exercise.tick(due + Duration::seconds(1)));
    assert_eq!(exercise.state(), AttemptState::Idle);
    assert_ne!(exercise.attempt().id(), verdict.attempt);
    assert_eq!(host.current_feedback(), None);
}

#[test]
fn every_challenge_once_per_pass() {
    let host = Rc::new(RecordingHost::new());
    let mut exercise = exercise(&host, 9);
    exercise.mount(sums(), host.signal());

    let mut seen = HashSet::new();
    seen.insert(*exercise.challenge().unwrap());
    for _ in 0..2 {
        host.advance();
        assert!(exercise.update(host.signal()));
        seen.insert(*exercise.challenge().unwrap());
    }
    assert_eq!(seen, sums().into_iter().collect::<HashSet<_>>());

    host.advance();
    assert!(exercise.update(host.signal()));
    assert!(sums().contains(exercise.challenge().unwrap()));
    assert!(!exercise.is_complete());
}

#[test]
fn empty_exercise_reports_completion_once() {
    let host = Rc::new(RecordingHost::new());
    let mut exercise = exercise(&host, 3);
    exercise.mount(Vec::new(), host.signal());

    assert!(exercise.challenge().is_none());
    assert!(exercise.is_complete());
    assert_eq!(host.attempts(), vec![true]);
    assert_eq!(
        host.current_feedback().map(|feedback| feedback.kind),
        Some(FeedbackKind::Congrats)
    );

    host.advance();
    assert!(exercise.update(host.signal()));
    assert_eq!(host.attempts(), vec![true]);
    assert!(matches!(exercise.verify(), Err(ExerciseError::NoChallenge)));
    assert!(matches!(exercise.select(1), Err(ExerciseError::NoChallenge)));
    assert_eq!(host.progress().stars, 1);
}

#[test]
fn missing_signal_never_draws() {
    let host = Rc::new(RecordingHost::without_signal());
    let mut exercise = exercise(&host, 4);
    exercise.mount(sums(), host.signal());
    assert_eq!(exercise.remaining(), 2);
    assert!(!exercise.update(None));

    // First value after mount is only a baseline.
    host.advance();
    assert!(!exercise.update(host.signal()));
    host.advance();
    assert!(exercise.update(host.signal()));
    assert_eq!(exercise.remaining(), 1);
}

#[test]
fn keypad_answers_are_typed_and_checked() {
    let host = Rc::new(RecordingHost::new());
    let mut exercise = keypad_exercise(&host);
    exercise.mount(sums(), host.signal());
    assert_eq!(host.keypad_owner(), Some(ExerciseId::new("sumas")));

    // Nothing typed yet: checking is a no-op, however often it is pressed.
    for _ in 0..3 {
        assert!(matches!(
            exercise.on_key(KeyToken::Check),
            Err(ExerciseError::Attempt(AttemptError::NoSelection))
        ));
    }
    assert!(host.attempts().is_empty());
    assert_eq!(exercise.state(), AttemptState::Idle);

    let correct = answer(exercise.challenge().unwrap());
    for digit in correct.to_string().chars() {
        assert_eq!(
            exercise.press(&digit.to_string()).unwrap(),
            KeyOutcome::Edited
        );
    }
    assert_eq!(exercise.input_text(), correct.to_string());
    assert!(matches!(exercise.press("enter"), Err(ExerciseError::Key(_))));

    let outcome = exercise.press("check").unwrap();
    assert!(matches!(&outcome, KeyOutcome::Submitted(submission) if submission.is_correct()));
    assert!(matches!(
        exercise.on_key(KeyToken::Digit(1)),
        Err(ExerciseError::Attempt(AttemptError::AlreadySolved))
    ));
    assert_eq!(host.attempts(), vec![true]);

    exercise.unmount();
    assert_eq!(host.keypad_owner(), None);
    assert!(matches!(
        exercise.on_key(KeyToken::Digit(1)),
        Err(ExerciseError::KeypadUnavailable)
    ));
}

#[test]
fn editing_after_a_wrong_answer_reopens_it() {
    let host = Rc::new(RecordingHost::new());
    let mut exercise = keypad_exercise(&host);
    exercise.mount(sums(), host.signal());

    exercise.press("0").unwrap();
    exercise.press("check").unwrap();
    assert_eq!(exercise.state(), AttemptState::VerifiedIncorrect);
    assert!(matches!(
        exercise.press("check"),
        Err(ExerciseError::Attempt(AttemptError::Pending))
    ));

    exercise.press("backspace").unwrap();
    assert_eq!(exercise.state(), AttemptState::Selected);
    assert_eq!(exercise.next_deadline(), None);
    assert_eq!(host.current_feedback(), None);
    assert_eq!(host.attempts(), vec![false]);
}

#[test]
fn manual_policy_waits_for_a_new_selection() {
    let host = Rc::new(RecordingHost::new());
    let settings = ExerciseSettings::with_retry(RetryPolicy::ManualReselect).unwrap();
    let mut exercise = exercise(&host, 6).with_settings(settings);
    exercise.mount(sums(), host.signal());

    exercise.select(0).unwrap();
    let verdict = exercise.verify().unwrap();
    assert_eq!(verdict.retry_at, None);
    assert!(!exercise.tick(fixed_now() + Duration::days(1)));
    assert_eq!(exercise.state(), AttemptState::VerifiedIncorrect);

    exercise.select(answer(exercise.challenge().unwrap())).unwrap();
    assert!(exercise.verify().unwrap().correct);
}

#[test]
fn garbage_after_a_wrong_answer_is_counted_at_once() {
    let host = Rc::new(RecordingHost::new());
    let mut exercise = text_exercise(&host, 7);
    exercise.mount(sums(), host.signal());

    exercise.submit_text("100").unwrap();
    assert_eq!(exercise.state(), AttemptState::VerifiedIncorrect);
    assert!(exercise.next_deadline().is_some());

    let outcome = exercise.submit_text("tres").unwrap();
    assert!(matches!(outcome, Submission::Invalid(_)));
    assert_eq!(host.attempts(), vec![false, false]);
    assert_eq!(
        host.current_feedback(),
        Some(FeedbackMessages::default().invalid_input())
    );
    assert_eq!(exercise.state(), AttemptState::Selected);
    assert_eq!(exercise.attempt().selection(), Some(&100));
    assert_eq!(exercise.next_deadline(), None);

    // The wrong answer is no longer on display, so sending it again is checked again.
    assert!(!exercise.submit_text("100").unwrap().is_correct());
    assert_eq!(host.attempts(), vec![false, false, false]);
}

#[test]
fn manual_policy_counts_garbage_after_a_wrong_answer() {
    let host = Rc::new(RecordingHost::new());
    let settings = ExerciseSettings::with_retry(RetryPolicy::ManualReselect).unwrap();
    let mut exercise = text_exercise(&host, 8).with_settings(settings);
    exercise.mount(sums(), host.signal());

    exercise.submit_text("0").unwrap();
    assert_eq!(exercise.next_deadline(), None);
    assert!(matches!(
        exercise.submit_text("0"),
        Err(ExerciseError::Attempt(AttemptError::Pending))
    ));

    let outcome = exercise.submit_text("?").unwrap();
    assert!(matches!(outcome, Submission::Invalid(_)));
    assert_eq!(host.attempts(), vec![false, false]);

    let correct = answer(exercise.challenge().unwrap()).to_string();
    assert!(exercise.submit_text(&correct).unwrap().is_correct());
    assert!(matches!(
        exercise.submit_text("?"),
        Err(ExerciseError::Attempt(AttemptError::AlreadySolved))
    ));
    assert_eq!(host.attempts(), vec![false, false, true]);
}

#[test]
fn load_switches_content_and_keypad_owner() {
    let host = Rc::new(RecordingHost::new());
    let mut exercise = keypad_exercise(&host);
    exercise.mount(sums(), host.signal());

    assert!(!exercise.load(ExerciseId::new("sumas"), vec![(9, 9)], host.signal()));
    assert!(exercise.load(ExerciseId::new("dobles"), vec![(9, 9)], host.signal()));
    assert_eq!(exercise.challenge(), Some(&(9, 9)));
    assert_eq!(host.keypad_owner(), Some(ExerciseId::new("dobles")));
}

#[test]
fn load_takes_the_restarted_counter_as_baseline() {
    let host = Rc::new(RecordingHost::new());
    let mut exercise = exercise(&host, 10);
    exercise.mount(sums(), host.signal());
    for _ in 0..5 {
        host.advance();
        assert!(exercise.update(host.signal()));
    }

    // The host counts again from zero for the new exercise.
    assert!(exercise.load(ExerciseId::new("dobles"), vec![(1, 1), (2, 2)], Some(0)));
    assert!(!exercise.update(Some(0)));
    assert!(exercise.update(Some(1)));
    assert_eq!(exercise.remaining(), 0);
}

#[test]
fn dropping_the_exercise_releases_the_keypad() {
    let host = Rc::new(RecordingHost::new());
    {
        let mut exercise = keypad_exercise(&host);
        exercise.mount(sums(), host.signal());
        assert!(host.keypad_owner().is_some());
    }
    assert_eq!(host.keypad_owner(), None);
}
