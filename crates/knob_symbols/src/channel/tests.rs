use super::*;

fn arity_error() -> CallError {
    CallError::ArityMismatch {
        name: "add".to_string(),
        expected: 2,
        received: 1,
    }
}

#[test]
fn buffer_channel_captures_messages_in_order() {
    let channel = BufferChannel::new();
    channel.report("first");
    channel.report("second");
    assert_eq!(channel.messages(), vec!["first", "second"]);
}

#[test]
fn buffer_channel_clear_empties_buffer() {
    let channel = BufferChannel::new();
    channel.report("hello");
    channel.clear();
    assert!(channel.messages().is_empty());
}

#[test]
fn buffer_channel_factory_reports_call_errors() {
    let channel = buffer_channel();
    channel.report(&arity_error());
    assert_eq!(
        channel.messages(),
        vec!["call to 'add' has wrong number of arguments: expected 2, received 1"]
    );
}

#[test]
fn silent_channel_discards_reports() {
    let channel = silent_channel();
    channel.report(&arity_error());
    assert!(channel.messages().is_empty());
}

#[test]
fn stderr_channel_has_no_captured_messages() {
    let channel = stderr_channel();
    // Should not panic
    channel.clear();
    assert!(channel.messages().is_empty());
}
