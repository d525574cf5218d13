//! Property-based tests using proptest
//!
//! Tests that verify properties hold for arbitrary inputs.

use freeswitch_exporter::freeswitch::protocol::{frame_command, read_body, read_headers};
use freeswitch_exporter::metrics::{ExporterMetrics, Sample};
use freeswitch_exporter::parsers::{
    module_loaded, parse_memory, parse_row_count, parse_status, parse_uptime, time_synced,
};
use proptest::prelude::*;
use tokio::io::BufReader;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to build runtime")
        .block_on(future)
}

proptest! {
    #[test]
    fn test_any_label_value_renders_without_panic(value in "\\PC*") {
        // Given: A sample with an arbitrary label value
        let metrics = ExporterMetrics::new().expect("Failed to create metrics");
        let sample = Sample::gauge("freeswitch_verto_status", "status", 1.0)
            .with_label("name", value.as_str());

        // When / Then: Rendering succeeds
        prop_assert!(metrics.render(&[sample]).is_ok());
    }

    #[test]
    fn test_row_count_round_trips(count in 0u32..1_000_000) {
        let body = format!(r#"{{"row_count":{}}}"#, count);
        prop_assert_eq!(parse_row_count("current_calls", body.as_bytes()).unwrap(), count as f64);
    }

    #[test]
    fn test_uptime_accepts_optional_newline(seconds in 0u64..10_000_000_000, newline in any::<bool>()) {
        let body = if newline { format!("{}\n", seconds) } else { seconds.to_string() };
        prop_assert_eq!(parse_uptime(body.as_bytes()).unwrap(), seconds as f64);
    }

    #[test]
    fn test_time_sync_is_symmetric(local in 0i64..4_000_000_000, drift in -10i64..10) {
        let remote = local + drift;
        prop_assert_eq!(time_synced(local, remote), time_synced(remote, local));
        prop_assert_eq!(time_synced(local, remote) == 1.0, drift.abs() < 3);
    }

    #[test]
    fn test_parsers_never_panic_on_garbage(body in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse_status(&body);
        let _ = parse_memory(&body);
        let _ = parse_uptime(&body);
        let _ = module_loaded(&body);
    }

    #[test]
    fn test_body_read_is_exact(payload in proptest::collection::vec(any::<u8>(), 0..2048), extra in "[a-z]{0,16}") {
        // Given: A payload of any bytes followed by unrelated data
        let mut stream = payload.clone();
        stream.extend_from_slice(extra.as_bytes());
        let mut reader: &[u8] = &stream;

        // When
        let body = block_on(read_body(&mut reader, payload.len())).unwrap();

        // Then: Exactly the payload is consumed
        prop_assert_eq!(body, payload);
        prop_assert_eq!(reader, extra.as_bytes());
    }

    #[test]
    fn test_header_values_survive_parsing(
        name in "[A-Za-z][A-Za-z-]{0,20}",
        value in "[!-~]([ -~]{0,40}[!-~])?",
    ) {
        // Given: One well-formed header line
        let raw = format!("{}: {}\n\n", name, value);
        let mut reader = BufReader::new(raw.as_bytes());

        // When
        let headers = block_on(read_headers(&mut reader)).unwrap();

        // Then: The value is found under any casing of the name
        prop_assert_eq!(headers.get(&name.to_uppercase()), Some(value.as_str()));
        prop_assert_eq!(headers.get(&name.to_lowercase()), Some(value.as_str()));
    }

    #[test]
    fn test_framed_command_ends_with_single_blank_line(command in "[a-z ]{1,40}") {
        let frame = frame_command(&command);
        prop_assert!(frame.ends_with("\n\n"));
        prop_assert_eq!(&frame[..command.len()], command.as_str());
    }
}
