use crate::port::channel;

#[test]
fn test_input_port_not_finished_while_producer_alive() {
    let (output, input) = channel::<i32>(1);

    assert!(!input.has_data());
    assert!(!input.is_finished());

    output.push(1).unwrap();
    assert!(input.has_data());
    assert!(!input.is_finished());
}

#[test]
fn test_input_port_finished_after_drain() {
    let (output, input) = channel::<i32>(2);
    output.push(1).unwrap();
    output.push(2).unwrap();
    output.finish();

    assert!(!input.is_finished());
    assert_eq!(input.pull(), Some(1));
    assert!(!input.is_finished());
    assert_eq!(input.pull(), Some(2));
    assert!(input.is_finished());
}

#[test]
fn test_input_port_close_drops_buffered_chunks() {
    let (output, input) = channel::<i32>(2);
    output.push(1).unwrap();
    input.set_needed();

    input.close();

    assert!(input.is_closed());
    assert!(input.is_finished());
    assert!(!input.has_data());
    assert!(!input.is_needed());
    assert_eq!(input.pull(), None);
    assert_eq!(output.len(), 0);
}

#[test]
fn test_input_port_finished_when_output_dropped() {
    let (output, input) = channel::<i32>(1);
    output.push(5).unwrap();
    drop(output);

    assert!(!input.is_finished());
    assert_eq!(input.pull(), Some(5));
    assert!(input.is_finished());
}
