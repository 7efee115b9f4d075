// tests/planner_properties.rs

use proptest::prelude::*;
use syncroute::sync::{Batch, Command, Destination, Route, plan};

fn destination_strategy() -> impl Strategy<Value = Destination> {
    prop_oneof![
        "/[a-z]{1,8}".prop_map(Destination::local),
        ("[a-z]{1,6}", "/[a-z ]{1,8}").prop_map(|(h, d)| Destination::remote(h, d)),
    ]
}

fn batch_strategy() -> impl Strategy<Value = Batch> {
    (
        proptest::collection::vec("/[a-z0-9 _.-]{1,12}", 0..4),
        proptest::collection::vec(destination_strategy(), 0..4),
        any::<bool>(),
        proptest::collection::vec("[a-z*.]{1,6}", 0..3),
    )
        .prop_map(|(sources, destinations, sudo, excludes)| Batch {
            sources,
            destinations,
            requires_sudo: sudo,
            chown: None,
            excludes,
        })
}

fn route_strategy() -> impl Strategy<Value = Route> {
    (proptest::collection::vec(batch_strategy(), 0..4), any::<bool>()).prop_map(
        |(batches, delete)| {
            let mut route = Route::new("prop").delete_extraneous(delete);
            route.batches = batches;
            route
        },
    )
}

proptest! {
    #[test]
    fn command_count_is_sum_of_pairs(route in route_strategy()) {
        let expected: usize = route.batches.iter().map(Batch::command_count).sum();
        prop_assert_eq!(plan(&route, None).len(), expected);
    }

    #[test]
    fn commands_follow_batch_source_destination_order(route in route_strategy()) {
        let p = plan(&route, None);
        let mut commands = p.iter();
        for batch in &route.batches {
            for source in &batch.sources {
                for destination in &batch.destinations {
                    let cmd = commands.next().expect("missing command");
                    let n = cmd.argv().len();
                    prop_assert_eq!(&cmd.argv()[n - 2], source);
                    prop_assert_eq!(cmd.argv()[n - 1].clone(), destination.to_string());
                }
            }
        }
        prop_assert!(commands.next().is_none());
    }

    #[test]
    fn every_command_starts_with_rsync_base_flags(route in route_strategy(), delete in proptest::option::of(any::<bool>())) {
        for cmd in plan(&route, delete).iter() {
            prop_assert_eq!(cmd.program(), "rsync");
            prop_assert_eq!(&cmd.argv()[1..3], &["-avz".to_string(), "--progress".to_string()]);
            let has_delete = cmd.argv().iter().any(|a| a == "--delete");
            prop_assert_eq!(has_delete, delete.unwrap_or(route.delete_extraneous));
        }
    }

    #[test]
    fn planning_is_deterministic(route in route_strategy()) {
        prop_assert_eq!(plan(&route, Some(true)), plan(&route, Some(true)));
    }

    #[test]
    fn pretty_line_round_trips(route in route_strategy()) {
        for cmd in plan(&route, None).iter() {
            let parsed = Command::from_line(&cmd.pretty_line()).unwrap();
            prop_assert_eq!(&parsed, cmd);
        }
    }
}
