//! 控制循环与关机流程测试（假时钟 + 假端口）

use rmd_client::config::{ActuatorConfig, ControlMode, RunConfig};
use rmd_client::control::{Clock, Command, ControlLoop, Effort, MeasuredState, StopOutcome};
use rmd_client::error::{CommandError, ConnectionError, RunError, StopError};
use rmd_client::port::{ActuatorPort, Connector};
use rmd_client::state::LoopState;
use rmd_client::status::StatusEvent;
use rmd_client::stop::StopToken;
use rmd_driver::DriverError;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 手动推进的时钟，`sleep` 直接推进时间
#[derive(Clone, Default)]
struct FakeClock {
    now: Arc<Mutex<Duration>>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl FakeClock {
    fn advance(&self, d: Duration) {
        *self.now.lock().unwrap() += d;
    }

    fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for FakeClock {
    fn elapsed(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}

#[derive(Default)]
struct PortLog {
    sends: Vec<(Duration, Command)>,
    stops: usize,
}

/// 记录每次调用的假端口
struct FakePort {
    clock: FakeClock,
    log: Arc<Mutex<PortLog>>,
    stop_token: StopToken,
    send_cost: Duration,
    /// 第 N 次发送后请求停止
    stop_after: Option<usize>,
    /// 第 N 次发送失败
    fail_on: Option<usize>,
    stop_error: Option<String>,
}

impl FakePort {
    fn new(clock: &FakeClock, stop_token: &StopToken) -> Self {
        Self {
            clock: clock.clone(),
            log: Arc::default(),
            stop_token: stop_token.clone(),
            send_cost: Duration::from_millis(1),
            stop_after: None,
            fail_on: None,
            stop_error: None,
        }
    }

    fn log(&self) -> Arc<Mutex<PortLog>> {
        Arc::clone(&self.log)
    }
}

impl ActuatorPort for FakePort {
    fn send(&mut self, command: &Command) -> Result<MeasuredState, CommandError> {
        let mut log = self.log.lock().unwrap();
        log.sends.push((self.clock.elapsed(), *command));
        let n = log.sends.len();
        drop(log);

        self.clock.advance(self.send_cost);
        if self.fail_on == Some(n) {
            return Err(CommandError::Driver(DriverError::Timeout {
                node_id: 1,
                timeout_ms: 50,
            }));
        }
        if self.stop_after == Some(n) {
            self.stop_token.request_stop();
        }

        Ok(match *command {
            Command::Impedance { position, velocity, .. } => MeasuredState {
                shaft_angle: position,
                shaft_speed: velocity,
                effort: Effort::Torque(0.0),
            },
            Command::AbsolutePosition { position, .. } => MeasuredState {
                shaft_angle: position,
                shaft_speed: 0.0,
                effort: Effort::Current(0.0),
            },
        })
    }

    fn stop(&mut self) -> Result<(), StopError> {
        self.log.lock().unwrap().stops += 1;
        match &self.stop_error {
            None => Ok(()),
            Some(reason) => Err(StopError::Rejected(reason.clone())),
        }
    }
}

fn control_loop<'a>(
    config: &RunConfig,
    clock: &FakeClock,
    events: &'a mut Vec<StatusEvent>,
) -> ControlLoop<FakeClock, &'a mut Vec<StatusEvent>> {
    ControlLoop::new(config, clock.clone(), events).unwrap()
}

fn tick_count(events: &[StatusEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, StatusEvent::Tick(_)))
        .count()
}

#[test]
fn test_one_send_and_one_status_line_per_tick() {
    let clock = FakeClock::default();
    let stop = StopToken::new();
    let mut port = FakePort::new(&clock, &stop);
    port.stop_after = Some(5);
    let log = port.log();

    let mut events = Vec::new();
    let report = control_loop(&RunConfig::default(), &clock, &mut events)
        .run_with_port(port, &stop)
        .unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.sends.len(), 5);
    assert_eq!(report.ticks, 5);
    assert_eq!(tick_count(&events), 5);
    assert_eq!(report.overruns, 0);
}

#[test]
fn test_tick_starts_are_one_period_apart() {
    let clock = FakeClock::default();
    let stop = StopToken::new();
    let mut port = FakePort::new(&clock, &stop);
    port.stop_after = Some(4);
    let log = port.log();

    let mut events = Vec::new();
    control_loop(&RunConfig::default(), &clock, &mut events)
        .run_with_port(port, &stop)
        .unwrap();

    let starts: Vec<Duration> = log.lock().unwrap().sends.iter().map(|(t, _)| *t).collect();
    assert_eq!(
        starts,
        vec![
            Duration::from_millis(0),
            Duration::from_millis(10),
            Duration::from_millis(20),
            Duration::from_millis(30),
        ]
    );
    // 每次睡眠扣除 1 ms 的往返耗时
    assert!(clock.sleeps().iter().all(|d| *d == Duration::from_millis(9)));
}

#[test]
fn test_stop_sequence_and_banners() {
    let clock = FakeClock::default();
    let stop = StopToken::new();
    let mut port = FakePort::new(&clock, &stop);
    port.stop_after = Some(2);
    let log = port.log();

    let mut events = Vec::new();
    let report = control_loop(&RunConfig::default(), &clock, &mut events)
        .run_with_port(port, &stop)
        .unwrap();

    assert_eq!(report.final_state, LoopState::Stopped);
    assert_eq!(
        report.states,
        vec![
            LoopState::Idle,
            LoopState::Connected,
            LoopState::Running,
            LoopState::Stopping,
            LoopState::Stopped,
        ]
    );
    assert_eq!(report.stop_outcome, Some(StopOutcome::Stopped));
    assert_eq!(log.lock().unwrap().stops, 1);

    assert_eq!(
        events[0],
        StatusEvent::Connected {
            node_id: 1,
            interface: "can2".to_string()
        }
    );
    assert!(matches!(events[1], StatusEvent::Starting { frequency_hz, .. } if frequency_hz == 1.0));
    let n = events.len();
    assert_eq!(events[n - 2], StatusEvent::StopRequested);
    assert_eq!(events[n - 1], StatusEvent::StopOutcome(StopOutcome::Stopped));
}

#[test]
fn test_impedance_banner_shows_configured_amplitude() {
    let clock = FakeClock::default();
    let stop = StopToken::new();
    let mut port = FakePort::new(&clock, &stop);
    port.stop_after = Some(1);

    let mut events = Vec::new();
    control_loop(&RunConfig::default(), &clock, &mut events)
        .run_with_port(port, &stop)
        .unwrap();

    // 运控模式内部以 rad 运行，横幅仍是配置的 45°
    assert_eq!(
        events[1],
        StatusEvent::Starting {
            amplitude_deg: 45.0,
            frequency_hz: 1.0,
        }
    );
    assert_eq!(
        events[1].to_string(),
        "Starting Sine Wave: Amp=45 deg, Freq=1 Hz\nPress Ctrl+C to stop."
    );
}

#[test]
fn test_stop_before_first_tick_sends_no_trajectory_command() {
    let clock = FakeClock::default();
    let stop = StopToken::new();
    stop.request_stop();
    let port = FakePort::new(&clock, &stop);
    let log = port.log();

    let mut events = Vec::new();
    let report = control_loop(&RunConfig::default(), &clock, &mut events)
        .run_with_port(port, &stop)
        .unwrap();

    let log = log.lock().unwrap();
    assert!(log.sends.is_empty());
    assert_eq!(log.stops, 1);
    assert_eq!(report.ticks, 0);
    assert_eq!(report.final_state, LoopState::Stopped);
}

#[test]
fn test_failed_stop_reaches_terminal_state_with_reason() {
    let clock = FakeClock::default();
    let stop = StopToken::new();
    let mut port = FakePort::new(&clock, &stop);
    port.stop_after = Some(1);
    port.stop_error = Some("no reply".to_string());
    let log = port.log();

    let mut events = Vec::new();
    let report = control_loop(&RunConfig::default(), &clock, &mut events)
        .run_with_port(port, &stop)
        .unwrap();

    assert_eq!(report.final_state, LoopState::Faulted);
    assert!(report.final_state.is_terminal());
    assert_eq!(report.stop_outcome, Some(StopOutcome::Failed("no reply".to_string())));
    assert_eq!(log.lock().unwrap().stops, 1);
    assert_eq!(
        events.last().map(|e| e.to_string()),
        Some("Failed to shutdown motor: no reply".to_string())
    );
}

#[test]
fn test_command_error_attempts_one_stop_then_faults() {
    let clock = FakeClock::default();
    let stop = StopToken::new();
    let mut port = FakePort::new(&clock, &stop);
    port.fail_on = Some(3);
    let log = port.log();

    let mut events = Vec::new();
    let err = control_loop(&RunConfig::default(), &clock, &mut events)
        .run_with_port(port, &stop)
        .unwrap_err();

    let RunError::Command { source, report } = err else {
        panic!("expected a command error");
    };
    assert!(matches!(source, CommandError::Driver(DriverError::Timeout { .. })));
    assert_eq!(report.ticks, 2);
    assert_eq!(report.final_state, LoopState::Faulted);
    assert_eq!(
        &report.states[2..],
        &[LoopState::Running, LoopState::Stopping, LoopState::Faulted]
    );
    assert_eq!(report.stop_outcome, Some(StopOutcome::Stopped));

    let log = log.lock().unwrap();
    assert_eq!(log.sends.len(), 3);
    assert_eq!(log.stops, 1);
    assert!(!events.contains(&StatusEvent::StopRequested));
}

#[test]
fn test_command_error_without_stop_goes_straight_to_faulted() {
    let clock = FakeClock::default();
    let stop = StopToken::new();
    let mut port = FakePort::new(&clock, &stop);
    port.fail_on = Some(1);
    let log = port.log();

    let mut config = RunConfig::default();
    config.control_loop.stop_on_command_error = false;

    let mut events = Vec::new();
    let err = control_loop(&config, &clock, &mut events)
        .run_with_port(port, &stop)
        .unwrap_err();

    let RunError::Command { report, .. } = err else {
        panic!("expected a command error");
    };
    assert_eq!(
        &report.states[2..],
        &[LoopState::Running, LoopState::Faulted]
    );
    assert_eq!(report.stop_outcome, None);
    assert_eq!(log.lock().unwrap().stops, 0);
}

#[test]
fn test_overrun_skips_sleep() {
    let clock = FakeClock::default();
    let stop = StopToken::new();
    let mut port = FakePort::new(&clock, &stop);
    port.send_cost = Duration::from_millis(15);
    port.stop_after = Some(3);

    let mut events = Vec::new();
    let report = control_loop(&RunConfig::default(), &clock, &mut events)
        .run_with_port(port, &stop)
        .unwrap();

    assert_eq!(report.ticks, 3);
    assert_eq!(report.overruns, 3);
    assert!(clock.sleeps().is_empty());
}

#[test]
fn test_impedance_reaches_amplitude_at_quarter_period() {
    let clock = FakeClock::default();
    let stop = StopToken::new();
    let mut port = FakePort::new(&clock, &stop);
    port.send_cost = Duration::ZERO;
    port.stop_after = Some(2);
    let log = port.log();

    let mut config = RunConfig::default();
    config.control_loop.period_ms = 250;

    let mut events = Vec::new();
    control_loop(&config, &clock, &mut events)
        .run_with_port(port, &stop)
        .unwrap();

    let log = log.lock().unwrap();
    let (t, command) = log.sends[1];
    assert_eq!(t, Duration::from_millis(250));
    let Command::Impedance {
        position,
        velocity,
        kp,
        kd,
        feedforward_torque,
    } = command
    else {
        panic!("expected an impedance command");
    };
    assert!((position.to_degrees() - 45.0).abs() < 1e-9);
    assert!(velocity.abs() < 1e-9);
    assert_eq!((kp, kd, feedforward_torque), (15.0, 1.0, 0.0));

    // 状态行以角度显示
    let line = events
        .iter()
        .filter_map(|e| match e {
            StatusEvent::Tick(line) => Some(line.to_string()),
            _ => None,
        })
        .nth(1)
        .unwrap();
    assert!(line.starts_with("Target:  45.00 deg | Target Vel:"));
}

#[test]
fn test_absolute_position_first_command() {
    let clock = FakeClock::default();
    let stop = StopToken::new();
    let mut port = FakePort::new(&clock, &stop);
    port.stop_after = Some(1);
    let log = port.log();

    let config = RunConfig {
        mode: ControlMode::AbsolutePosition,
        ..Default::default()
    };

    let mut events = Vec::new();
    control_loop(&config, &clock, &mut events)
        .run_with_port(port, &stop)
        .unwrap();

    let log = log.lock().unwrap();
    assert_eq!(
        log.sends[0].1,
        Command::AbsolutePosition {
            position: 0.0,
            max_speed: 190.0 * 6.0,
        }
    );
    assert!(matches!(events[1], StatusEvent::Starting { amplitude_deg, .. } if amplitude_deg == 45.0));
}

struct UnreachableConnector;

impl Connector for UnreachableConnector {
    type Port = FakePort;

    fn connect(&self, actuator: &ActuatorConfig) -> Result<FakePort, ConnectionError> {
        Err(ConnectionError {
            interface: actuator.interface.clone(),
            node_id: actuator.node_id,
            source: DriverError::InvalidInput("interface can2 is down".to_string()),
        })
    }
}

#[test]
fn test_connection_failure_is_fatal() {
    let clock = FakeClock::default();
    let stop = StopToken::new();
    let mut events = Vec::new();

    let err = control_loop(&RunConfig::default(), &clock, &mut events)
        .run(&UnreachableConnector, &stop)
        .unwrap_err();

    assert!(matches!(err, RunError::Connection(_)));
    assert!(err.to_string().starts_with("Failed to connect to motor 1 on can2"));
    assert!(events.is_empty());
}

#[test]
fn test_invalid_config_is_rejected_before_running() {
    let mut config = RunConfig::default();
    config.trajectory.frequency_hz = 0.0;
    let mut events: Vec<StatusEvent> = Vec::new();
    assert!(ControlLoop::new(&config, FakeClock::default(), &mut events).is_err());
}
