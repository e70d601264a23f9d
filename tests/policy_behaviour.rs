//! Epsilon schedules and epsilon-greedy selection

use std::collections::HashMap;

use qlearn::{EpisodeScheduled, EpsilonGreedy, EpsilonSchedule, Policy, UniformSource};

fn values(_state: &u8, action: &char) -> f64 {
    match action {
        'a' => 0.5,
        'b' => 2.0,
        'c' => 2.0,
        'd' => -1.0,
        _ => 0.0,
    }
}

#[test]
fn always_exploring_is_roughly_uniform() {
    let schedule = EpsilonSchedule::linear(1.0, 1.0, 0.0).unwrap();
    let mut policy = EpsilonGreedy::seeded(schedule, 2024);
    let actions = ['a', 'b', 'c', 'd'];

    let mut counts: HashMap<char, usize> = HashMap::new();
    for _ in 0..4000 {
        let chosen = policy.select(&0u8, &actions, &values).unwrap();
        *counts.entry(*chosen).or_default() += 1;
    }

    for action in actions {
        let count = counts.get(&action).copied().unwrap_or(0);
        assert!(
            (800..=1200).contains(&count),
            "action {action} chosen {count} times"
        );
    }
}

#[test]
fn never_exploring_always_picks_first_best() {
    let mut policy = EpsilonGreedy::seeded(EpsilonSchedule::constant(0.0).unwrap(), 5);

    for _ in 0..500 {
        assert_eq!(policy.select(&0u8, &['a', 'b', 'c', 'd'], &values), Some(&'b'));
        assert_eq!(policy.select(&0u8, &['d', 'c', 'b'], &values), Some(&'c'));
        assert_eq!(policy.select(&0u8, &['d', 'a'], &values), Some(&'a'));
    }
}

#[test]
fn empty_action_list_signals_terminal() {
    let mut policy = EpsilonGreedy::seeded(EpsilonSchedule::default(), 1);
    let none: [char; 0] = [];
    for _ in 0..10 {
        assert!(policy.select(&0u8, &none, &values).is_none());
    }
}

#[test]
fn schedules_are_monotone_non_increasing() {
    let schedules = [
        EpsilonSchedule::linear(1.0, 0.05, 0.01).unwrap(),
        EpsilonSchedule::linear_over(0.8, 0.1, 37).unwrap(),
        EpsilonSchedule::exponential(1.0, 0.01, 0.05).unwrap(),
        EpsilonSchedule::exponential(0.5, 0.2, 2.0).unwrap(),
    ];
    for schedule in schedules {
        let mut previous = schedule.epsilon(0);
        for episode in 1..2000 {
            let current = schedule.epsilon(episode);
            assert!(
                current <= previous,
                "{schedule:?} rose at episode {episode}: {previous} -> {current}"
            );
            previous = current;
        }
    }
}

#[test]
fn schedules_start_at_start_value() {
    assert_eq!(EpsilonSchedule::linear(0.9, 0.1, 0.2).unwrap().epsilon(0), 0.9);
    assert_eq!(
        EpsilonSchedule::exponential(0.7, 0.1, 0.3)
            .unwrap()
            .epsilon(0),
        0.7
    );
}

#[test]
fn linear_reaches_end_exactly_and_stays() {
    let schedule = EpsilonSchedule::linear(1.0, 0.2, 0.1).unwrap();
    assert!((schedule.epsilon(4) - 0.6).abs() < 1e-12);
    assert_eq!(schedule.epsilon(8), 0.2);
    assert_eq!(schedule.epsilon(9), 0.2);
    assert_eq!(schedule.epsilon(10_000), 0.2);
}

#[test]
fn exponential_approaches_end_from_above() {
    let schedule = EpsilonSchedule::exponential(1.0, 0.1, 0.5).unwrap();
    let expected = 0.1 + 0.9 * (-0.5f64 * 3.0).exp();
    assert!((schedule.epsilon(3) - expected).abs() < 1e-12);
    assert!(schedule.epsilon(20) > 0.1);
    assert!(schedule.epsilon(20) - 0.1 < 1e-4);
}

#[test]
fn episode_counter_drives_exploration() {
    /// Always draws 0.5
    struct Half;

    impl UniformSource for Half {
        fn next_uniform(&mut self) -> f64 {
            0.5
        }
    }

    // ε: 1.0 at episode 0, 0.0 from episode 1 on
    let schedule = EpsilonSchedule::linear(1.0, 0.0, 1.0).unwrap();
    let mut policy = EpsilonGreedy::with_source(schedule, Half);
    let actions = ['d', 'a', 'b', 'c'];

    // Explores: floor(0.5 * 4) = index 2
    assert_eq!(policy.select(&0u8, &actions, &values), Some(&'b'));

    Policy::<u8, char>::as_scheduled(&mut policy)
        .expect("epsilon-greedy is schedulable")
        .set_episode(1);
    assert_eq!(policy.episode(), 1);
    assert_eq!(policy.epsilon(), 0.0);

    // Exploits: first of the tied best
    assert_eq!(policy.select(&0u8, &['d', 'c', 'b'], &values), Some(&'c'));
}

#[test]
fn invalid_schedules_are_rejected() {
    assert!(EpsilonSchedule::linear(1.2, 0.1, 0.1).is_err());
    assert!(EpsilonSchedule::linear(1.0, -0.1, 0.1).is_err());
    assert!(EpsilonSchedule::linear(1.0, 0.1, -0.1).is_err());
    assert!(EpsilonSchedule::exponential(1.0, 0.1, f64::NAN).is_err());
    assert!(EpsilonSchedule::constant(1.5).is_err());
}
