mod common;

use common::{BusOp, MockBus, MockDelay};
use ksz_switch_rs::{CounterKind, Error, Port, PortCounters, SwitchDevice};

#[test]
fn counter_read_issues_exact_sequence() {
    let mut bus = MockBus::new();
    bus.regs[119] = 0x01;
    bus.regs[120] = 0x2C;
    let mut device = SwitchDevice::new(&mut bus, MockDelay::default());

    let value = device.read_counter(CounterKind::RxBytes, Port::P2).unwrap();
    drop(device);

    assert_eq!(value, 300);
    assert_eq!(
        bus.ops,
        vec![
            BusOp::Write(110, 29),
            BusOp::Read(110),
            BusOp::Write(111, 4),
            BusOp::Read(111),
            BusOp::Read(119),
            BusOp::Read(120),
        ]
    );
}

#[test]
fn crc_errors_use_lower_window() {
    let mut bus = MockBus::new();
    let mut device = SwitchDevice::new(&mut bus, MockDelay::default());

    device.read_counter(CounterKind::RxCrcErr, Port::P3).unwrap();
    drop(device);

    assert_eq!(bus.writes(), vec![(110, 28), (111, 70)]);
}

#[test]
fn counter_combines_high_and_low_bytes() {
    let mut bus = MockBus::new();
    bus.regs[119] = 0xFF;
    bus.regs[120] = 0xFF;
    let mut device = SwitchDevice::new(bus, MockDelay::default());

    assert_eq!(
        device.read_counter(CounterKind::TxDrop, Port::P4).unwrap(),
        65_535
    );
}

#[test]
fn port_snapshot_reads_every_counter() {
    let mut bus = MockBus::new();
    bus.regs[120] = 7;
    let mut device = SwitchDevice::new(&mut bus, MockDelay::default());

    let counters = device.read_port_counters(Port::P1).unwrap();
    drop(device);

    assert_eq!(
        counters,
        PortCounters {
            rx_crc_err: 7,
            rx_bytes: 7,
            tx_bytes: 7,
            rx_drop: 7,
            tx_drop: 7,
        }
    );
    assert_eq!(
        bus.writes(),
        vec![
            (110, 28),
            (111, 6),
            (110, 29),
            (111, 0),
            (110, 29),
            (111, 1),
            (110, 29),
            (111, 2),
            (110, 29),
            (111, 3),
        ]
    );
}

#[test]
fn counter_read_stops_on_bus_fault() {
    let mut bus = MockBus::new();
    bus.fail_at = Some(111);
    let mut device = SwitchDevice::new(&mut bus, MockDelay::default());

    let result = device.read_counter(CounterKind::RxDrop, Port::P2);
    drop(device);

    assert!(matches!(result, Err(Error::Transport { addr: 111 })));
    assert!(!bus.ops.contains(&BusOp::Read(119)));
}
