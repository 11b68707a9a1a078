use super::*;

/// builds a record with the given name and accounting fields; everything else is zeroed.
pub(crate) fn record(tid: u32, name: &str, utime: u64, stime: u64, core: u32) -> String {
    let mut fields = vec!["0".to_owned(); 49];
    fields[0] = "S".to_owned();
    fields[TaskStat::UTIME] = utime.to_string();
    fields[TaskStat::STIME] = stime.to_string();
    fields[TaskStat::PROCESSOR] = core.to_string();
    format!("{tid} ({name}) {}\n", fields.join(" "))
}

mod task_stat_parse_tests {
    use super::*;

    // a bash shell, as printed by a 6.x kernel.
    const BASH: &str = "1234 (bash) S 1200 1234 1234 34816 5678 4194304 2345 6789 0 1 12 7 20 5 \
        20 0 1 0 98765 12345678 1234 18446744073709551615 94000000000000 94000000100000 \
        140700000000000 0 0 0 65536 3670020 1266777851 0 0 0 17 3 0 0 0 0 0 94000000200000 \
        94000000210000 94000001000000 140700000001000 140700000001010 140700000001010 \
        140700000002000 0";

    #[test]
    fn bash() {
        let stat = BASH.parse::<TaskStat>().unwrap();
        assert_eq!(stat.utime, UserHz::new(12));
        assert_eq!(stat.stime, UserHz::new(7));
        assert_eq!(stat.processor, CoreId(3));
        assert_eq!(stat.ticks(), UserHz::new(19));
    }

    #[test]
    fn name_with_spaces() {
        let stat = record(7, "Web Content", 40, 2, 5)
            .parse::<TaskStat>()
            .unwrap();
        assert_eq!(stat.ticks(), UserHz::new(42));
        assert_eq!(stat.processor, CoreId(5));
    }

    #[test]
    fn name_with_parens() {
        let stat = record(7, ") 1 2 3 (x) ) S", 100, 40, 2)
            .parse::<TaskStat>()
            .unwrap();
        assert_eq!(stat.ticks(), UserHz::new(140));
        assert_eq!(stat.processor, CoreId(2));
    }

    #[test]
    fn empty_name() {
        let stat = record(7, "", 1, 1, 0).parse::<TaskStat>().unwrap();
        assert_eq!(stat.ticks(), UserHz::new(2));
    }

    #[test]
    fn missing_name() {
        let err = "1234 bash S 1 2 3".parse::<TaskStat>().unwrap_err();
        assert_eq!(err, TaskStatParseError::MissingName);
    }

    #[test]
    fn truncated() {
        let err = "1234 (bash) S 1200 1234 1234 34816 5678 4194304 2345 6789 0 1 12 7 20"
            .parse::<TaskStat>()
            .unwrap_err();
        assert_eq!(
            err,
            TaskStatParseError::MissingField {
                index: TaskStat::PROCESSOR
            }
        );
    }

    #[test]
    fn empty() {
        let err = "".parse::<TaskStat>().unwrap_err();
        assert_eq!(err, TaskStatParseError::MissingName);
    }

    #[test]
    fn bad_ticks() {
        let line = record(7, "x", 1, 1, 0).replacen(" 1 1 ", " one 1 ", 1);
        let err = line.parse::<TaskStat>().unwrap_err();
        assert!(matches!(err, TaskStatParseError::Ticks(_)));
    }

    #[test]
    fn negative_processor() {
        let line = BASH.replace(" 17 3 ", " 17 -1 ");
        let err = line.parse::<TaskStat>().unwrap_err();
        assert!(matches!(err, TaskStatParseError::Processor(_)));
    }
}

mod user_hz_tests {
    use super::*;

    #[test]
    fn since_forward() {
        assert_eq!(UserHz::new(140).since(UserHz::new(100)), Some(UserHz::new(40)));
    }

    #[test]
    fn since_unchanged() {
        assert_eq!(UserHz::new(100).since(UserHz::new(100)), None);
    }

    #[test]
    fn since_backwards() {
        assert_eq!(UserHz::new(5).since(UserHz::new(100)), None);
    }

    #[test]
    fn sum() {
        let total = [1, 2, 3].into_iter().map(UserHz::new).sum::<UserHz>();
        assert_eq!(total, UserHz::new(6));
    }
}

mod core_id_tests {
    use super::*;

    #[test]
    fn index_in_range() {
        assert_eq!(CoreId(3).index(32), Some(3));
    }

    #[test]
    fn index_out_of_range() {
        assert_eq!(CoreId(40).index(32), None);
        assert_eq!(CoreId(32).index(32), None);
    }

    #[test]
    fn parse_trims() {
        assert_eq!("7\n".parse::<CoreId>(), Ok(CoreId(7)));
    }
}
