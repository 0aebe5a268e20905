//! End-to-end call setup/teardown exercised against a bare `Controller`,
//! in the spirit of the teacher's `ComponentTest` harness but scaled down
//! to this engine's single-link shape.

use pri_config::ControllerConfig;
use pri_core::{CallRef, CrefWidth, OctetWriter};
use pri_engine::{Controller, EventKind};
use pri_ie::q921::{Address, Control, Frame};
use pri_ie::q931::header::{Header, MessageType, ProtocolDiscriminator};
use pri_ie::q931::ie::channel_id::{ChannelId, ChannelSelection};
use pri_ie::q931::ie::{tag, CodesetState};
use pri_ie::q931::message::OutgoingIe;

fn network_config() -> ControllerConfig {
    ControllerConfig::new(pri_core::Side::Network, pri_core::Layout::Pri, pri_core::SwitchVariant::NationalIsdn2)
}

fn establish_link(ctl: &mut Controller) {
    ctl.start();
    let sabme = Frame {
        address: Address { sapi: 0, command_response: true, tei: 0 },
        control: Control::SetAsyncBalancedModeExtended { poll: true },
        payload: Vec::new(),
    };
    ctl.receive(&sabme.encode());
    while ctl.poll_event().is_some() {}
}

fn encode_setup(call_ref_value: u16) -> Vec<u8> {
    let header = Header {
        protocol_discriminator: ProtocolDiscriminator::Q931,
        call_ref: CallRef::new(call_ref_value, true, CrefWidth::Pri).unwrap(),
        message_type: MessageType::Setup,
    };
    let mut body = OctetWriter::new();
    header.encode(&mut body);
    let mut codeset = CodesetState::new();
    let channel_id = ChannelId {
        exclusive: true,
        d_channel_indicated: false,
        interface_implicit: true,
        selection: ChannelSelection::ChannelNumber(3),
    };
    let mut channel_id_bytes = OctetWriter::new();
    channel_id.encode(&mut channel_id_bytes, false);
    let ies = vec![
        OutgoingIe::codeset0(tag::BEARER_CAPABILITY, vec![0x80, 0x90, 0xa3]),
        OutgoingIe::codeset0(tag::CHANNEL_IDENTIFICATION, channel_id_bytes.into_vec()),
        OutgoingIe::codeset0(tag::CALLED_PARTY_NUMBER, { let mut v = vec![0x81]; v.extend_from_slice(b"5551212"); v }),
    ];
    for ie in ies {
        pri_ie::q931::ie::push_ie(&mut body, &mut codeset, ie.codeset, ie.tag, ie.value.as_deref());
    }

    let frame = Frame {
        address: Address { sapi: 0, command_response: true, tei: 0 },
        control: Control::Information { n_s: 0, n_r: 0, poll: false },
        payload: body.into_vec(),
    };
    frame.encode()
}

#[test]
fn incoming_setup_produces_ring_event() {
    pri_core::debug::setup_logging_verbose();
    let mut ctl = Controller::new(network_config());
    establish_link(&mut ctl);

    ctl.receive(&encode_setup(1));

    let event = ctl.poll_event().expect("ring event expected");
    match event.kind {
        EventKind::Ring { called, channel, .. } => {
            assert_eq!(called.as_deref(), Some("5551212"));
            assert_eq!(channel, Some(3));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn answering_then_hanging_up_tears_down_the_call() {
    pri_core::debug::setup_logging_verbose();
    let mut ctl = Controller::new(network_config());
    establish_link(&mut ctl);
    ctl.receive(&encode_setup(2));
    let ring = ctl.poll_event().expect("ring event");
    let handle = match ring.kind {
        EventKind::Ring { call, .. } => call,
        other => panic!("unexpected event: {other:?}"),
    };

    assert!(pri_engine::facade::answer(&mut ctl, handle));
    assert!(pri_engine::facade::hangup(&mut ctl, handle, None));
    // Hangup sends DISCONNECT and waits under T305; the call only leaves
    // the pool once the far end's RELEASE arrives.
    assert!(ctl.call_pool().get(handle).is_some());

    let call_ref = CallRef::new(2, true, CrefWidth::Pri).unwrap();
    let header = Header { protocol_discriminator: ProtocolDiscriminator::Q931, call_ref, message_type: MessageType::Release };
    let mut body = OctetWriter::new();
    header.encode(&mut body);
    let frame = Frame {
        address: Address { sapi: 0, command_response: true, tei: 0 },
        control: Control::Information { n_s: 1, n_r: 0, poll: false },
        payload: body.into_vec(),
    };
    ctl.receive(&frame.encode());

    assert!(ctl.call_pool().get(handle).is_none());
}
