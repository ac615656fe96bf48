//! Property tests for the startup line

use proptest::prelude::*;
use waitgate::{Controller, Transcript};

proptest! {
    #[test]
    fn started_line_lists_arguments_in_order(args in prop::collection::vec(".*", 0..8)) {
        let transcript = Transcript::new();
        let controller = Controller::with_console(transcript.clone());
        controller.shutdown();
        controller.start(&args).unwrap();

        let lines = transcript.lines();
        prop_assert_eq!(lines.len(), 2);
        prop_assert_eq!(&lines[0], &format!("started: [{}]", args.join(", ")));
        prop_assert_eq!(&lines[1], "stopped");
    }

    #[test]
    fn reloads_never_release(reloads in 0usize..16) {
        let transcript = Transcript::new();
        let controller = Controller::with_console(transcript.clone());
        for _ in 0..reloads {
            controller.reload();
        }
        prop_assert_eq!(controller.phase(), waitgate::Phase::Waiting);
        prop_assert_eq!(controller.reload_count(), reloads as u64);
        prop_assert_eq!(transcript.count("reloaded"), reloads);
    }
}
