//! The device-state synchronizer
//!
//! `DeviceSync` keeps its own view of position and stall state - the last
//! values accepted or published, not a mirror of the controller. Position
//! publication is optimistic: a commanded target is published immediately,
//! and only re-read from the sensor when a command is abandoned (STOP or
//! stall). Redundant broker retries are suppressed by the idempotent
//! position setter.

use fenestra_protocol::{
    position_payload, stall_payload, CommandError, CoverCommand, CoverTopics, DeviceId,
    DeviceInfo, DiscoveryDescriptor, DiscoveryError, ProblemTopics,
};

use crate::control::PositionController;
use crate::traits::{BrokerClient, InboundMessage, MotorDriver, PositionSensor, StatusIndicator};

/// Interval between forced state republications (20 minutes)
///
/// The broker-side entities are configured to expire when unseen for three
/// times this long; the heartbeat exists purely to defeat that expiry.
pub const HEARTBEAT_INTERVAL_MS: u64 = 20 * 60 * 1000;

/// Entity expiry hint advertised in discovery, in seconds
pub const EXPIRE_AFTER_S: u32 = 3 * (HEARTBEAT_INTERVAL_MS / 1000) as u32;

/// Errors from the synchronizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError<E> {
    /// Position value outside [0, 1]
    PositionOutOfRange,
    /// Inbound payload rejected
    Command(CommandError),
    /// Discovery payload could not be encoded
    Discovery(DiscoveryError),
    /// Transport failure; propagates to the process boundary unhandled
    Broker(E),
}

impl<E> From<CommandError> for SyncError<E> {
    fn from(e: CommandError) -> Self {
        SyncError::Command(e)
    }
}

impl<E> From<DiscoveryError> for SyncError<E> {
    fn from(e: DiscoveryError) -> Self {
        SyncError::Discovery(e)
    }
}

/// Broker-facing state synchronizer for the actuator
///
/// Owns the broker client and the immutable discovery descriptors built at
/// startup. All methods run on the scheduler's single thread.
pub struct DeviceSync<B> {
    broker: B,
    cover: DiscoveryDescriptor,
    problem: DiscoveryDescriptor,
    cover_topics: CoverTopics,
    problem_topics: ProblemTopics,
    /// Last position accepted or published, as a fraction
    position: f32,
    /// Last stall status published
    stalled: bool,
    /// Timestamp of the last publication
    last_update_ms: u64,
}

impl<B: BrokerClient> DeviceSync<B> {
    /// Build the synchronizer and its discovery descriptors
    ///
    /// Does not touch the network; call [`DeviceSync::start`] to connect
    /// and register.
    pub fn new(broker: B, id: &DeviceId, device: DeviceInfo) -> Result<Self, DiscoveryError> {
        Ok(Self {
            broker,
            cover: DiscoveryDescriptor::cover(id, device.clone(), EXPIRE_AFTER_S)?,
            problem: DiscoveryDescriptor::problem(id, device, EXPIRE_AFTER_S)?,
            cover_topics: CoverTopics::for_device(id)?,
            problem_topics: ProblemTopics::for_device(id)?,
            position: 0.0,
            stalled: false,
            last_update_ms: 0,
        })
    }

    /// Connect, register and publish the initial state
    ///
    /// Must complete before any command is accepted: connect, publish each
    /// discovery descriptor retained, subscribe to the command topics, then
    /// pull the real position from the controller and force a publication.
    pub fn start<M, S, L>(
        &mut self,
        ctrl: &mut PositionController<M, S, L>,
        now_ms: u64,
    ) -> Result<(), SyncError<B::Error>>
    where
        M: MotorDriver,
        S: PositionSensor,
        L: StatusIndicator,
    {
        self.broker.connect().map_err(SyncError::Broker)?;

        let cover_json = self.cover.encode()?;
        self.broker
            .publish(self.cover.config_topic(), cover_json.as_bytes(), true)
            .map_err(SyncError::Broker)?;
        self.broker
            .subscribe(&self.cover_topics.command)
            .map_err(SyncError::Broker)?;
        self.broker
            .subscribe(&self.cover_topics.set_position)
            .map_err(SyncError::Broker)?;

        // The problem sensor is publish-only, nothing to subscribe to
        let problem_json = self.problem.encode()?;
        self.broker
            .publish(self.problem.config_topic(), problem_json.as_bytes(), true)
            .map_err(SyncError::Broker)?;

        // Initial position comes from the controller, not any cached value
        self.position = ctrl.position();
        self.send_update(now_ms)
    }

    /// Pull the next buffered inbound message from the broker
    pub fn poll(&mut self) -> Result<Option<InboundMessage>, SyncError<B::Error>> {
        self.broker.poll().map_err(SyncError::Broker)
    }

    /// Publish the full state (stall and position) unconditionally
    pub fn send_update(&mut self, now_ms: u64) -> Result<(), SyncError<B::Error>> {
        self.broker
            .publish(
                &self.problem_topics.state,
                stall_payload(self.stalled).as_bytes(),
                false,
            )
            .map_err(SyncError::Broker)?;

        let pos = position_payload(self.position);
        self.broker
            .publish(&self.cover_topics.position_state, pos.as_bytes(), false)
            .map_err(SyncError::Broker)?;

        self.last_update_ms = now_ms;
        Ok(())
    }

    /// Check whether the heartbeat interval has elapsed since the last
    /// publication
    pub fn heartbeat_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_update_ms) >= HEARTBEAT_INTERVAL_MS
    }

    /// Handle one inbound broker message
    ///
    /// Messages on unknown topics are ignored. Malformed or out-of-range
    /// payloads are rejected without side effects.
    pub fn handle_message<M, S, L>(
        &mut self,
        topic: &str,
        payload: &[u8],
        ctrl: &mut PositionController<M, S, L>,
        now_ms: u64,
    ) -> Result<(), SyncError<B::Error>>
    where
        M: MotorDriver,
        S: PositionSensor,
        L: StatusIndicator,
    {
        if topic == self.cover_topics.command.as_str() {
            match CoverCommand::parse_state(payload)? {
                CoverCommand::Open => {
                    self.set_position(1.0, ctrl, now_ms)?;
                }
                CoverCommand::Close => {
                    self.set_position(0.0, ctrl, now_ms)?;
                }
                CoverCommand::Stop => {
                    // Abandon the move, clear any stall, resync to reality
                    ctrl.stop(false);
                    self.stalled = false;
                    self.position = ctrl.position();
                    self.send_update(now_ms)?;
                }
                // parse_state never yields SetPosition
                CoverCommand::SetPosition(_) => {}
            }
        } else if topic == self.cover_topics.set_position.as_str() {
            if let Some(fraction) = CoverCommand::parse_set_position(payload)?.target_fraction() {
                self.set_position(fraction, ctrl, now_ms)?;
            }
        }
        Ok(())
    }

    /// Command a new position, publishing optimistically
    ///
    /// Idempotent: when `position` equals the last accepted value this is a
    /// complete no-op (no controller call, no publish), which suppresses
    /// redundant motor commands on broker retries. Returns whether anything
    /// was done.
    #[allow(clippy::float_cmp)] // idempotence is exact-value suppression
    pub fn set_position<M, S, L>(
        &mut self,
        position: f32,
        ctrl: &mut PositionController<M, S, L>,
        now_ms: u64,
    ) -> Result<bool, SyncError<B::Error>>
    where
        M: MotorDriver,
        S: PositionSensor,
        L: StatusIndicator,
    {
        if !(0.0..=1.0).contains(&position) {
            return Err(SyncError::PositionOutOfRange);
        }
        if position == self.position {
            return Ok(false);
        }

        ctrl.set_target(position)
            .map_err(|_| SyncError::PositionOutOfRange)?;
        self.position = position;
        // Optimistic: this is the commanded position, not a confirmed arrival
        self.send_update(now_ms)?;
        Ok(true)
    }

    /// Propagate the controller's stall flag
    ///
    /// No-op when unchanged. On a fresh stall the commanded target is
    /// abandoned, so the actual position is re-read from the controller
    /// before publishing.
    pub fn set_stalled<M, S, L>(
        &mut self,
        stalled: bool,
        ctrl: &mut PositionController<M, S, L>,
        now_ms: u64,
    ) -> Result<(), SyncError<B::Error>>
    where
        M: MotorDriver,
        S: PositionSensor,
        L: StatusIndicator,
    {
        if stalled == self.stalled {
            return Ok(());
        }

        self.stalled = stalled;
        if stalled {
            self.position = ctrl.position();
        }
        self.send_update(now_ms)
    }

    /// Last accepted or published position fraction
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Last published stall status
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Timestamp of the last publication
    pub fn last_update_ms(&self) -> u64 {
        self.last_update_ms
    }

    #[cfg(test)]
    pub(crate) fn broker_mut(&mut self) -> &mut B {
        &mut self.broker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Direction;
    use heapless::{String, Vec};

    const MAC: [u8; 6] = [0x5c, 0xcf, 0x7f, 0x01, 0xab, 0xcd];

    #[derive(Debug, Clone, PartialEq)]
    struct Published {
        topic: String<64>,
        payload: Vec<u8, 512>,
        retained: bool,
    }

    #[derive(Default)]
    struct MockBroker {
        connected: bool,
        published: Vec<Published, 32>,
        subscribed: Vec<String<64>, 8>,
        inbound: Vec<InboundMessage, 8>,
    }

    impl MockBroker {
        fn enqueue(&mut self, topic: &str, payload: &[u8]) {
            self.inbound
                .push(InboundMessage::new(topic, payload).unwrap())
                .unwrap();
        }

        fn published_on<'a>(&'a self, topic: &str) -> impl Iterator<Item = &'a Published> {
            let t: String<64> = String::try_from(topic).unwrap();
            self.published.iter().filter(move |p| p.topic == t)
        }
    }

    impl BrokerClient for MockBroker {
        type Error = ();

        fn connect(&mut self) -> Result<(), ()> {
            self.connected = true;
            Ok(())
        }

        fn publish(&mut self, topic: &str, payload: &[u8], retained: bool) -> Result<(), ()> {
            let entry = Published {
                topic: String::try_from(topic).map_err(|_| ())?,
                payload: Vec::from_slice(payload)?,
                retained,
            };
            self.published.push(entry).map_err(|_| ())
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), ()> {
            self.subscribed
                .push(String::try_from(topic).map_err(|_| ())?)
                .map_err(|_| ())
        }

        fn poll(&mut self) -> Result<Option<InboundMessage>, ()> {
            if self.inbound.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.inbound.remove(0)))
            }
        }
    }

    #[derive(Default)]
    struct MockMotor {
        running: bool,
        direction: Option<Direction>,
    }

    impl crate::traits::MotorDriver for MockMotor {
        fn drive(&mut self, dir: Direction) {
            self.running = true;
            self.direction = Some(dir);
        }

        fn stop(&mut self) {
            self.running = false;
        }

        fn is_running(&self) -> bool {
            self.running
        }
    }

    /// Sensor pinned at a fixed reading
    struct ConstSensor(f32);

    impl crate::traits::PositionSensor for ConstSensor {
        fn read(&mut self) -> f32 {
            self.0
        }
    }

    #[derive(Default)]
    struct MockLed {
        on: bool,
    }

    impl crate::traits::StatusIndicator for MockLed {
        fn set_on(&mut self, on: bool) {
            self.on = on;
        }

        fn toggle(&mut self) {
            self.on = !self.on;
        }
    }

    type TestController = PositionController<MockMotor, ConstSensor, MockLed>;

    fn test_controller(position: f32) -> TestController {
        PositionController::new(MockMotor::default(), ConstSensor(position), MockLed::default())
    }

    fn test_sync() -> DeviceSync<MockBroker> {
        let id = DeviceId::from_mac(MAC);
        let info = DeviceInfo::new("FW1", "Fenestra", "Window", &id);
        DeviceSync::new(MockBroker::default(), &id, info).unwrap()
    }

    const POSITION_TOPIC: &str = "Household/window/wa_abcd_position/position/notify";
    const STALE_TOPIC: &str = "Household/window/wa_abcd_stale_detector/stale/notify";
    const COMMAND_TOPIC: &str = "Household/window/wa_abcd_position/state/set";
    const SET_POSITION_TOPIC: &str = "Household/window/wa_abcd_position/position/set";

    #[test]
    fn test_start_sequence() {
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.42);
        sync.start(&mut ctrl, 1000).unwrap();

        let broker = &sync.broker;
        assert!(broker.connected);

        // Discovery config published retained, before any state traffic
        assert_eq!(
            broker.published[0].topic.as_str(),
            "homeassistant/cover/wa_abcd_position/config"
        );
        assert!(broker.published[0].retained);
        assert_eq!(
            broker.published[1].topic.as_str(),
            "homeassistant/binary_sensor/wa_abcd_stale_detector/config"
        );
        assert!(broker.published[1].retained);

        // Command subscriptions in place
        assert!(broker.subscribed.iter().any(|t| t == COMMAND_TOPIC));
        assert!(broker.subscribed.iter().any(|t| t == SET_POSITION_TOPIC));

        // Initial state pulled from the controller and published
        let positions: Vec<_, 8> = broker
            .published_on(POSITION_TOPIC)
            .map(|p| p.payload.clone())
            .collect();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].as_slice(), b"42");
        assert_eq!(sync.last_update_ms(), 1000);
    }

    #[test]
    fn test_send_update_publishes_both_states() {
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.5);
        sync.start(&mut ctrl, 0).unwrap();
        sync.broker.published.clear();

        sync.send_update(5000).unwrap();
        assert_eq!(sync.broker.published.len(), 2);
        assert_eq!(sync.broker.published[0].topic.as_str(), STALE_TOPIC);
        assert_eq!(sync.broker.published[0].payload.as_slice(), b"OFF");
        assert_eq!(sync.broker.published[1].topic.as_str(), POSITION_TOPIC);
        assert_eq!(sync.last_update_ms(), 5000);
    }

    #[test]
    fn test_set_position_is_idempotent() {
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.0);
        sync.start(&mut ctrl, 0).unwrap();
        sync.broker.published.clear();

        assert!(sync.set_position(0.55, &mut ctrl, 10).unwrap());
        assert_eq!(sync.broker.published_on(POSITION_TOPIC).count(), 1);
        assert_eq!(ctrl.target(), Some(0.55));

        // Same value again: no publish, no controller call
        assert!(!sync.set_position(0.55, &mut ctrl, 20).unwrap());
        assert_eq!(sync.broker.published_on(POSITION_TOPIC).count(), 1);
        assert_eq!(sync.last_update_ms(), 10);
    }

    #[test]
    fn test_set_position_rejects_out_of_range() {
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.0);
        sync.start(&mut ctrl, 0).unwrap();

        assert_eq!(
            sync.set_position(1.5, &mut ctrl, 10),
            Err(SyncError::PositionOutOfRange)
        );
        assert_eq!(
            sync.set_position(-0.5, &mut ctrl, 10),
            Err(SyncError::PositionOutOfRange)
        );
        assert_eq!(ctrl.target(), None);
    }

    #[test]
    fn test_set_position_publishes_commanded_value() {
        // Optimistic publication: the commanded position goes out before
        // the actuator has moved anywhere.
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.10);
        sync.start(&mut ctrl, 0).unwrap();
        sync.broker.published.clear();

        sync.set_position(0.55, &mut ctrl, 10).unwrap();
        let last = sync.broker.published_on(POSITION_TOPIC).last().unwrap();
        assert_eq!(last.payload.as_slice(), b"55");
    }

    #[test]
    fn test_open_close_commands() {
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.5);
        sync.start(&mut ctrl, 0).unwrap();

        sync.handle_message(COMMAND_TOPIC, b"OPEN", &mut ctrl, 10).unwrap();
        assert_eq!(ctrl.target(), Some(1.0));

        sync.handle_message(COMMAND_TOPIC, b"CLOSE", &mut ctrl, 20).unwrap();
        assert_eq!(ctrl.target(), Some(0.0));
    }

    #[test]
    fn test_set_position_topic_command() {
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.10);
        sync.start(&mut ctrl, 0).unwrap();
        sync.broker.published.clear();

        sync.handle_message(SET_POSITION_TOPIC, b"55", &mut ctrl, 10).unwrap();
        assert_eq!(ctrl.target(), Some(0.55));
        let last = sync.broker.published_on(POSITION_TOPIC).last().unwrap();
        assert_eq!(last.payload.as_slice(), b"55");
    }

    #[test]
    fn test_stop_command_resyncs_and_publishes_once() {
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.30);
        sync.start(&mut ctrl, 0).unwrap();
        sync.set_position(0.9, &mut ctrl, 5).unwrap();
        sync.broker.published.clear();

        sync.handle_message(COMMAND_TOPIC, b"STOP", &mut ctrl, 10).unwrap();

        assert_eq!(ctrl.target(), None);
        assert!(!sync.is_stalled());
        // Position re-read from the sensor (0.30), one publication pair
        assert_eq!(sync.position(), 0.30);
        assert_eq!(sync.broker.published_on(POSITION_TOPIC).count(), 1);
        let last = sync.broker.published_on(POSITION_TOPIC).last().unwrap();
        assert_eq!(last.payload.as_slice(), b"30");
    }

    #[test]
    fn test_malformed_payloads_are_rejected_without_effect() {
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.5);
        sync.start(&mut ctrl, 0).unwrap();
        sync.broker.published.clear();

        assert_eq!(
            sync.handle_message(COMMAND_TOPIC, b"JUMP", &mut ctrl, 10),
            Err(SyncError::Command(CommandError::Malformed))
        );
        assert_eq!(
            sync.handle_message(SET_POSITION_TOPIC, b"150", &mut ctrl, 10),
            Err(SyncError::Command(CommandError::OutOfRange))
        );
        assert_eq!(ctrl.target(), None);
        assert!(sync.broker.published.is_empty());
    }

    #[test]
    fn test_unknown_topic_is_ignored() {
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.5);
        sync.start(&mut ctrl, 0).unwrap();
        sync.broker.published.clear();

        sync.handle_message("Household/window/other/state/set", b"OPEN", &mut ctrl, 10)
            .unwrap();
        assert_eq!(ctrl.target(), None);
        assert!(sync.broker.published.is_empty());
    }

    #[test]
    fn test_stall_transition_rereads_position() {
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.40);
        sync.start(&mut ctrl, 0).unwrap();
        sync.set_position(0.9, &mut ctrl, 5).unwrap();
        sync.broker.published.clear();

        sync.set_stalled(true, &mut ctrl, 10).unwrap();
        assert!(sync.is_stalled());
        // Commanded 0.9 was abandoned; actual 0.40 published instead
        assert_eq!(sync.position(), 0.40);
        let stale = sync.broker.published_on(STALE_TOPIC).last().unwrap();
        assert_eq!(stale.payload.as_slice(), b"ON");
        let pos = sync.broker.published_on(POSITION_TOPIC).last().unwrap();
        assert_eq!(pos.payload.as_slice(), b"40");
    }

    #[test]
    fn test_set_stalled_is_idempotent() {
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.5);
        sync.start(&mut ctrl, 0).unwrap();
        sync.broker.published.clear();

        sync.set_stalled(false, &mut ctrl, 10).unwrap();
        assert!(sync.broker.published.is_empty());

        sync.set_stalled(true, &mut ctrl, 20).unwrap();
        assert_eq!(sync.broker.published.len(), 2);

        sync.set_stalled(true, &mut ctrl, 30).unwrap();
        assert_eq!(sync.broker.published.len(), 2);
    }

    #[test]
    fn test_poll_drains_inbound_in_order() {
        let mut sync = test_sync();
        sync.broker.enqueue(COMMAND_TOPIC, b"OPEN");
        sync.broker.enqueue(SET_POSITION_TOPIC, b"55");

        let first = sync.poll().unwrap().unwrap();
        assert_eq!(first.topic.as_str(), COMMAND_TOPIC);
        let second = sync.poll().unwrap().unwrap();
        assert_eq!(second.payload.as_slice(), b"55");
        assert_eq!(sync.poll().unwrap(), None);
    }

    #[test]
    fn test_heartbeat_due() {
        let mut sync = test_sync();
        let mut ctrl = test_controller(0.5);
        sync.start(&mut ctrl, 0).unwrap();

        assert!(!sync.heartbeat_due(HEARTBEAT_INTERVAL_MS - 1));
        assert!(sync.heartbeat_due(HEARTBEAT_INTERVAL_MS));
        sync.send_update(HEARTBEAT_INTERVAL_MS).unwrap();
        assert!(!sync.heartbeat_due(HEARTBEAT_INTERVAL_MS + 1));
    }

    #[test]
    fn test_expire_after_is_three_heartbeats() {
        assert_eq!(EXPIRE_AFTER_S as u64 * 1000, 3 * HEARTBEAT_INTERVAL_MS);
    }
}
