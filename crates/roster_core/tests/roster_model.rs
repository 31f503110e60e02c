use roster_core::{
    Activity, ActivityStates, Collection, EvaluationCycle, EvaluationState, Mutation,
    MutationOutcome, Rejection, Roster, Student,
};
use std::collections::BTreeSet;

fn state(value: u8) -> EvaluationState {
    EvaluationState::new(value).unwrap()
}

fn activities(count: usize) -> Vec<Activity> {
    (0..count)
        .map(|index| Activity::new(format!("activity {index}")))
        .collect()
}

fn student_with(name: &str, states: &[(usize, u8)]) -> Student {
    let mut student = Student::new(name, None);
    student.activity_states = states
        .iter()
        .map(|&(key, value)| (key, state(value)))
        .collect();
    student
}

fn subsets(len: usize) -> impl Iterator<Item = BTreeSet<usize>> {
    (0u32..(1 << len)).map(move |mask| (0..len).filter(|bit| mask & (1 << bit) != 0).collect())
}

#[test]
fn removing_activities_renumbers_every_subset_against_original_indexes() {
    for len in 1..=6 {
        let full: Vec<(usize, u8)> = (0..len).map(|key| (key, (key % 3) as u8 + 1)).collect();
        let even: Vec<(usize, u8)> = full.iter().copied().filter(|(key, _)| key % 2 == 0).collect();
        let students = vec![
            student_with("full", &full),
            student_with("even", &even),
            student_with("none", &[]),
        ];

        for removed in subsets(len).filter(|set| !set.is_empty()) {
            let (mut roster, report) =
                Roster::from_parts(students.clone(), activities(len), EvaluationCycle::default());
            assert!(report.is_clean());

            let outcome = roster.remove_activities(&removed);
            assert!(outcome.is_applied(), "len={len} removed={removed:?}");
            assert_eq!(roster.activities().len(), len - removed.len());
            assert!(roster.is_consistent());

            for (before, after) in students.iter().zip(roster.students()) {
                let expected: ActivityStates = before
                    .activity_states
                    .iter()
                    .filter(|(key, _)| !removed.contains(*key))
                    .map(|(&key, &value)| (key - removed.iter().filter(|&&d| d < key).count(), value))
                    .collect();
                assert_eq!(after.activity_states, expected, "len={len} removed={removed:?}");
                assert!(after
                    .activity_states
                    .keys()
                    .all(|&key| key < len - removed.len()));
            }

            let surviving: Vec<&str> = roster
                .activities()
                .iter()
                .map(|activity| activity.name.as_str())
                .collect();
            let expected_names: Vec<String> = (0..len)
                .filter(|index| !removed.contains(index))
                .map(|index| format!("activity {index}"))
                .collect();
            assert_eq!(surviving, expected_names);
        }
    }
}

#[test]
fn deleting_middle_activity_shifts_higher_keys_only() {
    let (mut roster, _) = Roster::from_parts(
        vec![student_with("Léa", &[(0, 1), (2, 2)])],
        activities(3),
        EvaluationCycle::default(),
    );

    let outcome = roster.remove_activities(&BTreeSet::from([1]));
    assert_eq!(
        outcome,
        MutationOutcome::Applied(Mutation::ActivitiesRemoved {
            removed: BTreeSet::from([1]),
            cleared_states: 0,
        })
    );

    let expected: ActivityStates = [(0, state(1)), (1, state(2))].into_iter().collect();
    assert_eq!(roster.students()[0].activity_states, expected);
}

#[test]
fn deleting_an_evaluated_activity_drops_its_state_for_everyone() {
    let (mut roster, _) = Roster::from_parts(
        vec![
            student_with("a", &[(1, 2)]),
            student_with("b", &[(0, 3), (1, 1)]),
        ],
        activities(2),
        EvaluationCycle::default(),
    );

    let outcome = roster.remove_activities(&BTreeSet::from([1]));
    assert!(matches!(
        outcome,
        MutationOutcome::Applied(Mutation::ActivitiesRemoved {
            cleared_states: 2,
            ..
        })
    ));
    assert!(roster.students()[0].activity_states.is_empty());
    assert_eq!(roster.students()[1].state_for(0), Some(state(3)));
}

#[test]
fn toggling_k_plus_one_times_restores_the_prior_state() {
    for k in 1..=4u8 {
        let cycle = EvaluationCycle::new(k).unwrap();
        for start in 0..=k {
            let initial: Vec<(usize, u8)> = if start == 0 { vec![] } else { vec![(0, start)] };
            let (mut roster, _) =
                Roster::from_parts(vec![student_with("s", &initial)], activities(1), cycle);
            let before = roster.students()[0].activity_states.clone();

            for _ in 0..=k {
                assert!(roster.toggle_activity_state(0, 0).is_applied());
            }

            assert_eq!(roster.students()[0].activity_states, before, "k={k} start={start}");
        }
    }
}

#[test]
fn four_toggles_walk_through_every_state_and_remove_the_key() {
    let mut roster = Roster::default();
    roster.add_student("Zoé", None);
    roster.add_activity("Puzzle");

    let mut seen = Vec::new();
    for _ in 0..5 {
        roster.toggle_activity_state(0, 0);
        seen.push(roster.students()[0].state_for(0).map(EvaluationState::value));
        if seen.last() == Some(&None) {
            assert!(!roster.students()[0].activity_states.contains_key(&0));
        }
    }
    assert_eq!(seen, vec![Some(1), Some(2), Some(3), None, Some(1)]);
}

#[test]
fn removing_students_leaves_survivor_states_untouched() {
    let survivors = [
        student_with("b", &[(0, 1), (3, 2)]),
        student_with("d", &[(1, 3)]),
    ];
    let (mut roster, _) = Roster::from_parts(
        vec![
            student_with("a", &[(2, 1)]),
            survivors[0].clone(),
            student_with("c", &[]),
            survivors[1].clone(),
        ],
        activities(4),
        EvaluationCycle::default(),
    );

    roster.remove_students(&BTreeSet::from([0, 2]));

    assert_eq!(roster.students(), &survivors);
}

#[test]
fn removing_students_zero_and_two_of_three_keeps_the_middle_one() {
    let mut roster = Roster::default();
    for name in ["Ana", "Ben", "Cid"] {
        roster.add_student(name, None);
    }

    roster.remove_students(&BTreeSet::from([0, 2]));

    assert_eq!(roster.students().len(), 1);
    assert_eq!(roster.students()[0].name, "Ben");
}

#[test]
fn appends_at_the_end_and_rejects_blank_names() {
    let mut roster = Roster::default();
    assert_eq!(
        roster.add_student("  Zoé ", None),
        MutationOutcome::Applied(Mutation::StudentAdded { index: 0 })
    );
    assert_eq!(
        roster.add_student("Amir", None),
        MutationOutcome::Applied(Mutation::StudentAdded { index: 1 })
    );
    assert_eq!(
        roster.add_student("   ", None),
        MutationOutcome::Rejected(Rejection::EmptyName)
    );
    assert_eq!(
        roster.add_activity("\t"),
        MutationOutcome::Rejected(Rejection::EmptyName)
    );
    assert_eq!(roster.students()[0].name, "Zoé");
    assert_eq!(roster.students().len(), 2);
    assert!(roster.activities().is_empty());
}

#[test]
fn invalid_references_are_no_ops() {
    let mut roster = Roster::default();
    roster.add_student("Zoé", None);
    roster.add_activity("Chant");
    let before = roster.clone();

    assert_eq!(
        roster.toggle_activity_state(0, 5),
        MutationOutcome::Rejected(Rejection::OutOfRange {
            collection: Collection::Activities,
            index: 5
        })
    );
    assert_eq!(
        roster.toggle_activity_state(3, 0),
        MutationOutcome::Rejected(Rejection::OutOfRange {
            collection: Collection::Students,
            index: 3
        })
    );
    assert_eq!(
        roster.remove_activities(&BTreeSet::from([0, 1])),
        MutationOutcome::Rejected(Rejection::OutOfRange {
            collection: Collection::Activities,
            index: 1
        })
    );
    assert_eq!(
        roster.remove_students(&BTreeSet::new()),
        MutationOutcome::Rejected(Rejection::EmptySelection)
    );
    assert_eq!(roster, before);
}

#[test]
fn from_parts_drops_dangling_keys_and_foreign_states() {
    let mut stale = student_with("x", &[(0, 1), (1, 2), (7, 1)]);
    stale.activity_states.insert(1, state(9));

    let (roster, report) = Roster::from_parts(vec![stale], activities(2), EvaluationCycle::default());

    assert_eq!(report.dangling_keys, 1);
    assert_eq!(report.invalid_states, 1);
    assert!(roster.is_consistent());
    assert_eq!(roster.students()[0].activity_states.len(), 1);
}

#[test]
fn from_parts_renumbers_states_past_a_blank_activity() {
    let stored = student_with("x", &[(0, 1), (1, 2), (2, 3)]);
    let stored_activities = vec![Activity::new("A"), Activity::new("  "), Activity::new("C")];

    let (roster, report) =
        Roster::from_parts(vec![stored], stored_activities, EvaluationCycle::default());

    assert_eq!(report.blank_names, 1);
    assert_eq!(report.orphaned_states, 1);
    assert_eq!(report.dangling_keys, 0);
    assert_eq!(
        roster.students()[0].activity_states,
        [(0, state(1)), (1, state(3))].into_iter().collect::<ActivityStates>()
    );
}
