// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        mpsc, Arc,
    },
    time::Duration,
};

use float_cmp::assert_approx_eq;
use parking_lot::Mutex;

use super::*;
use crate::{
    codec::{pack21, pwm_correction},
    display::{PixelBuffer, FRAME_BUFFER_LEN, FRAME_HEADER},
    input::{Button, PadEventKind, NO_BUTTON_INDEX},
    pedal::PedalContact,
    sysex::{command, decode_sysex_frame},
    test_util::{spawn_responder, RecordingConnection, SentMessages},
    Error,
};

type TestPush = Push<RecordingConnection, RecordingDisplay>;

fn short_timeout_config() -> SysexTransportConfig {
    SysexTransportConfig {
        reply_timeout: Duration::from_millis(200),
    }
}

#[derive(Debug, Clone, Default)]
struct RecordingDisplay {
    transfers: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl DisplayConnection for RecordingDisplay {
    fn write_bulk(&mut self, data: &[u8]) -> Result<()> {
        self.transfers.lock().push(data.to_vec());
        Ok(())
    }
}

/// A connected handle without a device that answers.
fn connected_push() -> (TestPush, SentMessages) {
    let push = TestPush::new(short_timeout_config());
    let (connection, sent) = RecordingConnection::new();
    push.connect_midi(connection).unwrap();
    (push, sent)
}

/// A connected handle with an emulated device that answers sysex commands.
fn connected_push_with_device<R>(mut respond: R) -> (TestPush, SentMessages)
where
    R: FnMut(u8, &[u8]) -> Option<Vec<u8>> + Send + 'static,
{
    let push = TestPush::new(short_timeout_config());
    let (connection, sent, rx) = RecordingConnection::with_forwarding();
    push.connect_midi(connection).unwrap();
    let mut input_handler = push.input_handler();
    spawn_responder(
        rx,
        move |code, args, _: &mpsc::Receiver<Vec<u8>>| respond(code, args),
        move |reply| {
            assert!(input_handler.handle_midi_input(TimeStamp::default(), reply));
        },
    );
    (push, sent)
}

fn sent_sysex(sent: &SentMessages) -> Vec<(u8, Vec<u8>)> {
    sent.take()
        .iter()
        .filter_map(|message| decode_sysex_frame(message))
        .map(|(code, args)| (code, args.to_vec()))
        .collect()
}

#[test]
fn connect_midi_twice() {
    let (push, _sent) = connected_push();
    assert!(push.is_midi_connected());
    let (connection, _) = RecordingConnection::new();
    assert!(matches!(
        push.connect_midi(connection),
        Err(Error::Connection(ConnectionError::AlreadyConnected))
    ));
    assert!(push.disconnect_midi().is_ok());
    assert!(!push.is_midi_connected());
    assert!(matches!(
        push.set_global_led_brightness(1),
        Err(Error::Connection(ConnectionError::NotConnected))
    ));
}

#[test]
fn set_led_color_palette_entry() {
    let (push, sent) = connected_push();
    push.set_led_color_palette_entry(5, LedColor::new(255, 128, 0, 1))
        .unwrap();
    assert_eq!(
        vec![(
            command::SET_LED_COLOR_PALETTE_ENTRY,
            vec![5, 0x7f, 0x01, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00]
        )],
        sent_sysex(&sent)
    );
    assert!(matches!(
        push.set_led_color_palette_entry(128, LedColor::default()),
        Err(Error::InvalidArgument { .. })
    ));
    assert_eq!(0, sent.len());
}

#[test]
fn led_color_palette_entry() {
    let (push, _sent) = connected_push_with_device(|code, args| {
        assert_eq!(command::GET_LED_COLOR_PALETTE_ENTRY, code);
        let mut reply = args.to_vec();
        reply.extend_from_slice(&[0x7f, 0x01, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00]);
        Some(reply)
    });
    assert_eq!(
        LedColor::new(255, 128, 0, 1),
        push.led_color_palette_entry(5).unwrap()
    );
}

#[test]
fn short_reply_is_a_protocol_error() {
    let (push, _sent) = connected_push_with_device(|_, _| Some(vec![5, 0x7f]));
    assert!(matches!(
        push.led_color_palette_entry(5),
        Err(Error::Protocol {
            command: command::GET_LED_COLOR_PALETTE_ENTRY,
            expected: 9,
            actual: 2,
        })
    ));
}

#[test]
fn led_pwm_frequency_is_clamped() {
    let (push, sent) = connected_push();
    push.set_led_pwm_frequency(1000).unwrap();
    push.set_led_pwm_frequency(0).unwrap();
    assert_eq!(
        vec![
            (
                command::SET_LED_PWM_FREQ_CORRECTION,
                pack21(pwm_correction(116)).to_vec()
            ),
            (
                command::SET_LED_PWM_FREQ_CORRECTION,
                pack21(pwm_correction(20)).to_vec()
            ),
        ],
        sent_sysex(&sent)
    );
}

#[test]
fn led_white_balance() {
    let (push, sent) = connected_push_with_device(|code, args| {
        (code == command::GET_LED_WHITE_BALANCE).then(|| vec![args[0], 0x00, 0x08])
    });
    push.set_led_white_balance(LedColorGroup::TouchStrip, 1024)
        .unwrap();
    assert_eq!(
        1024,
        push.led_white_balance(LedColorGroup::PadGreen).unwrap()
    );
    assert_eq!(
        vec![
            (command::SET_LED_WHITE_BALANCE, vec![10, 0x00, 0x08]),
            (command::GET_LED_WHITE_BALANCE, vec![4]),
        ],
        sent_sysex(&sent)
    );
}

#[test]
fn set_button_color() {
    let (push, sent) = connected_push();
    push.set_button_color(Button::Scene, Some(0), 5, None)
        .unwrap();
    push.set_button_color(
        Button::DisplayTop,
        Some(7),
        127,
        Some(LedAnimation {
            kind: LedAnimationKind::Pulse,
            duration: LedAnimationDuration::Quarter,
        }),
    )
    .unwrap();
    assert_eq!(
        vec![vec![0xb0, 43, 5], vec![0xb9, 109, 127]],
        sent.take()
    );
    assert!(matches!(
        push.set_button_color(Button::Scene, Some(8), 5, None),
        Err(Error::InvalidArgument { .. })
    ));
    assert!(matches!(
        push.set_button_color(Button::Scene, None, 5, None),
        Err(Error::InvalidArgument { .. })
    ));
    assert_eq!(0, sent.len());
}

#[test]
fn set_pad_colors() {
    let (push, sent) = connected_push();
    push.set_pad_color(0, 0, 127).unwrap();
    push.set_pad_animation(
        7,
        7,
        1,
        Some(LedAnimation {
            kind: LedAnimationKind::Blink,
            duration: LedAnimationDuration::Half,
        }),
    )
    .unwrap();
    assert_eq!(vec![vec![0x90, 92, 127], vec![0x9f, 43, 1]], sent.take());
    assert!(matches!(
        push.set_pad_color(8, 0, 1),
        Err(Error::InvalidArgument { .. })
    ));
    push.set_global_pad_color(3).unwrap();
    let messages = sent.take();
    assert_eq!(64, messages.len());
    assert!(messages
        .iter()
        .all(|message| message[0] == 0x90 && message[2] == 3));
}

#[test]
fn aftertouch() {
    let (push, sent) = connected_push_with_device(|code, _| {
        (code == command::GET_AFTERTOUCH_MODE).then(|| vec![1])
    });
    push.set_global_aftertouch_range(300, 16383).unwrap();
    push.set_global_aftertouch_mode(AftertouchMode::Channel)
        .unwrap();
    assert_eq!(
        AftertouchMode::Polyphonic,
        push.global_aftertouch_mode().unwrap()
    );
    assert_eq!(
        vec![
            (
                command::SET_PAD_PARAMETERS,
                vec![0, 0, 0, 0, 44, 2, 0x7f, 0x7f]
            ),
            (command::SET_AFTERTOUCH_MODE, vec![0]),
            (command::GET_AFTERTOUCH_MODE, vec![]),
        ],
        sent_sysex(&sent)
    );
}

#[test]
fn unknown_aftertouch_mode() {
    let (push, _sent) = connected_push_with_device(|_, _| Some(vec![5]));
    assert!(matches!(
        push.global_aftertouch_mode(),
        Err(Error::InvalidReply {
            command: command::GET_AFTERTOUCH_MODE,
            value: 5,
        })
    ));
}

#[test]
fn pad_velocity_curve_is_sent_in_chunks() {
    let (push, sent) = connected_push();
    let mut curve = [0; PAD_VELOCITY_CURVE_ENTRIES];
    for (entry, value) in curve.iter_mut().zip(0..) {
        *entry = value;
    }
    push.set_global_pad_velocity_curve(&curve).unwrap();
    let calls = sent_sysex(&sent);
    assert_eq!(16, calls.len());
    for ((code, args), start) in calls.into_iter().zip((0..).step_by(8)) {
        assert_eq!(command::SET_PAD_VELOCITY_CURVE_ENTRY, code);
        let expected: Vec<u8> = std::iter::once(start).chain(start..start + 8).collect();
        assert_eq!(expected, args);
    }
}

#[test]
fn pad_sensitivity() {
    let (push, sent) = connected_push_with_device(|code, args| {
        (code == command::GET_SELECTED_PAD_SETTINGS).then(|| vec![args[0], args[1], 2])
    });
    push.set_pad_sensitivity(0, 0, PadSensitivity::Reduced)
        .unwrap();
    push.set_global_pad_sensitivity(PadSensitivity::Regular)
        .unwrap();
    assert_eq!(PadSensitivity::Low, push.pad_sensitivity(7, 7).unwrap());
    assert_eq!(
        vec![
            (command::SELECT_PAD_SETTINGS, vec![8, 1, 1]),
            (command::SELECT_PAD_SETTINGS, vec![0, 0, 0]),
            (command::GET_SELECTED_PAD_SETTINGS, vec![1, 8]),
        ],
        sent_sysex(&sent)
    );
    assert!(matches!(
        push.pad_sensitivity(0, 8),
        Err(Error::InvalidArgument { .. })
    ));
}

#[test]
fn touch_strip() {
    let (push, sent) = connected_push_with_device(|code, _| {
        (code == command::GET_TOUCH_STRIP_CONFIGURATION).then(|| vec![0b010_1000])
    });
    let config = push.touch_strip_config().unwrap();
    assert!(config.led_point);
    assert!(config.autoreturn);
    assert!(!config.controlled_by_host);
    push.set_touch_strip_config(TouchStripConfig {
        controlled_by_host: true,
        ..config
    })
    .unwrap();
    push.set_touch_strip_leds(&[7; TOUCH_STRIP_LEDS]).unwrap();
    assert_eq!(
        vec![
            (command::GET_TOUCH_STRIP_CONFIGURATION, vec![]),
            (command::SET_TOUCH_STRIP_CONFIGURATION, vec![0b010_1001]),
            (command::SET_TOUCH_STRIP_LEDS, vec![0x3f; 15]),
        ],
        sent_sysex(&sent)
    );
}

#[test]
fn sample_pedals() {
    let (push, sent) = connected_push_with_device(|code, _| {
        (code == command::SAMPLE_PEDAL_DATA).then(|| vec![0x7f, 0x7f, 1, 0, 0, 1, 0, 0])
    });
    assert_eq!(
        PedalSampleData {
            pedal_1_ring: 16383,
            pedal_1_tip: 1,
            pedal_2_ring: 128,
            pedal_2_tip: 0,
        },
        push.sample_pedals(3).unwrap()
    );
    assert_eq!(
        vec![(command::SAMPLE_PEDAL_DATA, vec![3])],
        sent_sysex(&sent)
    );
}

#[test]
fn configure_pedal_contacts() {
    let (push, sent) = connected_push();
    let events = Arc::new(Mutex::new(Vec::new()));
    push.on_pedal({
        let events = Arc::clone(&events);
        move |event| events.lock().push(event)
    });

    // Initially unassigned
    assert!(!push.handle_midi_input(TimeStamp::default(), &[0xb0, 66, 127]));

    push.set_pedal_configuration(PedalContact::Pedal1Tip, true)
        .unwrap();
    // Already assigned
    push.set_pedal_configuration(PedalContact::Pedal1Tip, true)
        .unwrap();
    assert_eq!(
        vec![(command::CONFIGURE_PEDAL, vec![1, 66, 0, 0])],
        sent_sysex(&sent)
    );
    assert_eq!(
        Some(66),
        push.pedal_assignments().cc_number(PedalContact::Pedal1Tip)
    );

    assert!(push.handle_midi_input(TimeStamp::default(), &[0xb0, 66, 127]));
    {
        let events = events.lock();
        assert_eq!(1, events.len());
        assert_eq!(PedalContact::Pedal1Tip, events[0].contact);
        assert_approx_eq!(f64, 1.0, events[0].value);
    }

    push.set_pedal_configuration(PedalContact::Pedal1Tip, false)
        .unwrap();
    assert_eq!(
        vec![(command::CONFIGURE_PEDAL, vec![1, 127, 0, 0])],
        sent_sysex(&sent)
    );
    assert!(!push.handle_midi_input(TimeStamp::default(), &[0xb0, 66, 127]));
    assert_eq!(1, events.lock().len());
}

#[test]
fn failed_pedal_configuration_is_retried() {
    let push = TestPush::new(short_timeout_config());
    assert!(matches!(
        push.set_pedal_configuration(PedalContact::Pedal1Tip, true),
        Err(Error::Connection(ConnectionError::NotConnected))
    ));
    assert_eq!(
        None,
        push.pedal_assignments().cc_number(PedalContact::Pedal1Tip)
    );
    assert_eq!(&[65_u8, 66][..], push.pedal_assignments().available_cc_numbers());

    let (connection, sent) = RecordingConnection::new();
    push.connect_midi(connection).unwrap();
    push.set_pedal_configuration(PedalContact::Pedal1Tip, true)
        .unwrap();
    assert_eq!(
        vec![(command::CONFIGURE_PEDAL, vec![1, 66, 0, 0])],
        sent_sysex(&sent)
    );

    push.disconnect_midi().unwrap();
    assert!(push
        .set_pedal_configuration(PedalContact::Pedal1Tip, false)
        .is_err());
    assert_eq!(
        Some(66),
        push.pedal_assignments().cc_number(PedalContact::Pedal1Tip)
    );
}

#[test]
fn pedal_curve() {
    let (push, sent) = connected_push();
    push.set_pedal_curve_limits(PedalContact::Pedal2Tip, 300, 1)
        .unwrap();
    let mut entries = [0; PEDAL_CURVE_ENTRIES];
    entries[PEDAL_CURVE_ENTRIES - 1] = 0xff;
    push.set_pedal_curve_entries(PedalContact::Pedal2Ring, &entries)
        .unwrap();
    let calls = sent_sysex(&sent);
    assert_eq!(
        (command::SET_PEDAL_CURVE_LIMITS, vec![4, 44, 2, 1, 0]),
        calls[0]
    );
    let curve_calls = &calls[1..];
    assert_eq!(4, curve_calls.len());
    for ((code, args), start) in curve_calls.iter().zip([0_u8, 8, 16, 24]) {
        assert_eq!(command::SET_PEDAL_CURVE_ENTRIES, *code);
        assert_eq!(18, args.len());
        assert_eq!([2, start], args[..2]);
    }
    assert_eq!([0x7f_u8, 0x01], curve_calls[3].1[16..]);
}

#[test]
fn statistics() {
    let (push, sent) = connected_push_with_device(|code, _| {
        (code == command::REQUEST_STATISTICS).then(|| vec![1, 0, 0x10, 0x01, 0x00, 0x00])
    });
    push.set_midi_mode(MidiMode::Dual).unwrap();
    let statistics = push.statistics(1).unwrap();
    assert_eq!(PowerSupplyStatus::External, statistics.power_supply);
    assert_eq!(144, statistics.uptime_secs);
    assert_eq!(Duration::from_secs(144), statistics.uptime());
    assert_eq!(
        vec![
            (command::SET_MIDI_MODE, vec![2]),
            (command::REQUEST_STATISTICS, vec![1]),
        ],
        sent_sysex(&sent)
    );
}

#[test]
fn display_brightness() {
    let (push, sent) = connected_push_with_device(|code, _| {
        (code == command::GET_DISPLAY_BRIGHTNESS).then(|| vec![0x7f, 0x01])
    });
    push.set_display_brightness(200).unwrap();
    assert_eq!(255, push.display_brightness().unwrap());
    assert_eq!(
        vec![
            (command::SET_DISPLAY_BRIGHTNESS, vec![0x48, 0x01]),
            (command::GET_DISPLAY_BRIGHTNESS, vec![]),
        ],
        sent_sysex(&sent)
    );
}

#[test]
fn draw_frame() {
    let push = TestPush::default();
    let pixels = PixelBuffer::new();
    assert!(matches!(
        push.draw_frame(&pixels),
        Err(Error::Connection(ConnectionError::NotConnected))
    ));

    let display = RecordingDisplay::default();
    push.connect_display(display.clone()).unwrap();
    assert!(push.is_display_connected());
    push.draw_frame(&pixels).unwrap();
    push.draw_frame(&pixels).unwrap();
    {
        let transfers = display.transfers.lock();
        assert_eq!(4, transfers.len());
        assert_eq!(FRAME_HEADER.to_vec(), transfers[0]);
        assert_eq!(FRAME_BUFFER_LEN, transfers[1].len());
        assert_eq!(transfers[1], transfers[3]);
    }

    assert!(push.disconnect_display().is_ok());
    assert!(matches!(
        push.disconnect_display(),
        Err(Error::Connection(ConnectionError::NotConnected))
    ));
}

#[test]
fn dispatch_decoded_input() {
    let push = TestPush::default();
    let pad_events = Arc::new(Mutex::new(Vec::new()));
    push.on_pad({
        let pad_events = Arc::clone(&pad_events);
        move |event| pad_events.lock().push(event)
    });
    let button_events = Arc::new(Mutex::new(Vec::new()));
    push.on_button({
        let button_events = Arc::clone(&button_events);
        move |event| button_events.lock().push(event)
    });

    let mut input_handler = push.input_handler();
    assert!(input_handler.handle_midi_input(TimeStamp::default(), &[0x90, 36, 100]));
    assert!(push.handle_midi_input(TimeStamp::default(), &[0xb0, 85, 127]));
    // Neither a pad nor a button
    assert!(!push.handle_midi_input(TimeStamp::default(), &[0xb0, 127, 127]));

    assert_eq!(
        vec![PadEvent {
            kind: PadEventKind::Pressed,
            x: 0,
            y: 7,
            velocity: 100,
        }],
        *pad_events.lock()
    );
    assert_eq!(1, button_events.lock().len());
    assert_eq!(Button::Play, button_events.lock()[0].button);

    push.clear_listeners();
    assert!(push.handle_midi_input(TimeStamp::default(), &[0x80, 36, 0]));
    assert_eq!(1, pad_events.lock().len());
}

extern "C" fn record_button_index(event: ButtonEvent, context: *mut c_void) {
    let index = context.cast::<AtomicU8>();
    #[allow(unsafe_code)]
    unsafe { &*index }.store(event.index, Ordering::Relaxed);
}

#[test]
fn raw_button_callback_receives_index() {
    let push = TestPush::default();
    let index = AtomicU8::new(0);
    push.register_button_callback(
        record_button_index,
        std::ptr::from_ref(&index).cast_mut().cast(),
    );
    assert!(push.handle_midi_input(TimeStamp::default(), &[0xb0, 104, 127]));
    assert_eq!(2, index.load(Ordering::Relaxed));
    assert!(push.handle_midi_input(TimeStamp::default(), &[0xb0, 85, 127]));
    assert_eq!(NO_BUTTON_INDEX, index.load(Ordering::Relaxed));
    push.clear_listeners();
}

#[test]
fn sysex_input_is_routed_to_the_transport() {
    let push = TestPush::default();
    let events = Arc::new(Mutex::new(0));
    push.on_encoder({
        let events = Arc::clone(&events);
        move |_| *events.lock() += 1
    });
    let sysex = crate::sysex::encode_sysex_frame(command::GET_LED_BRIGHTNESS, &[0x40]);
    assert!(push.handle_midi_input(TimeStamp::default(), &sysex));
    assert!(!push.handle_midi_input(TimeStamp::default(), &[0xf0, 0x7e, 0xf7]));
    assert_eq!(0, *events.lock());
}
