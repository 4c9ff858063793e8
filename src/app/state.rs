//! Application state
//!
//! Everything the experience mutates lives here and is owned by the frame
//! loop. Listener threads never touch it; they only send messages.

use throwball_core::{
    BallSpec, BodyKey, BodyMode, EntityKey, MeshAnchorRegistry, MeshChange, MeshOutcome, RigidTransform, Transform,
    Vec3, World,
};
use throwball_input::{GrabTarget, GripEvaluation, GripTracker, HandUpdate, JointId, LatestHands};

use crate::config::AppConfig;
use crate::session::{ImmersiveSpaceState, ProviderSupport, SessionEvent, SessionMonitor};

/// Result of [`AppState::spawn_ball`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned(EntityKey),
    /// No tracked right hand with an index fingertip yet
    HandUnavailable,
    /// A ball already exists this session
    AlreadySpawned(EntityKey),
}

/// The ball as seen by the grip tracker
///
/// Pairs the ball entity with its body so that transform writes move both.
pub struct BallHandle<'w> {
    world: &'w mut World,
    entity: EntityKey,
    body: BodyKey,
}

impl<'w> BallHandle<'w> {
    pub fn new(world: &'w mut World, entity: EntityKey) -> Option<Self> {
        let body = world.get_entity(entity)?.physics_body?;
        world.physics().get_body(body)?;
        Some(Self { world, entity, body })
    }
}

impl GrabTarget for BallHandle<'_> {
    fn position(&self) -> Vec3 {
        self.world
            .physics()
            .get_body(self.body)
            .map_or(Vec3::ZERO, |body| body.position)
    }

    fn mode(&self) -> BodyMode {
        self.world
            .physics()
            .get_body(self.body)
            .map_or(BodyMode::Dynamic, |body| body.mode())
    }

    fn set_mode(&mut self, mode: BodyMode) {
        self.world.physics_mut().set_body_mode(self.body, mode);
    }

    fn set_transform(&mut self, transform: RigidTransform) {
        self.world.set_entity_transform(self.entity, Transform::from(transform));
    }

    fn apply_force(&mut self, force: Vec3) -> bool {
        self.world.physics_mut().apply_force(self.body, force)
    }
}

/// Single owner of the scene, hands, grip state and session status
pub struct AppState {
    world: World,
    ball_spec: BallSpec,
    ball: Option<EntityKey>,
    hands: LatestHands,
    grip: GripTracker,
    meshes: MeshAnchorRegistry,
    session: SessionMonitor,
    immersive_space: ImmersiveSpaceState,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            world: World::with_physics(config.physics_world_config()),
            ball_spec: config.ball,
            ball: None,
            hands: LatestHands::new(),
            grip: GripTracker::new(config.grip),
            meshes: MeshAnchorRegistry::new(),
            session: SessionMonitor::new(),
            immersive_space: ImmersiveSpaceState::Closed,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The ball entity, once spawned
    pub fn ball(&self) -> Option<EntityKey> {
        self.ball
    }

    pub fn ball_body(&self) -> Option<BodyKey> {
        self.ball
            .and_then(|key| self.world.get_entity(key))
            .and_then(|entity| entity.physics_body)
    }

    pub fn is_gripping(&self) -> bool {
        self.grip.is_gripping()
    }

    /// Set by authorization denial or a provider fault
    pub fn error_state(&self) -> bool {
        self.session.error_state()
    }

    pub fn session(&self) -> &SessionMonitor {
        &self.session
    }

    pub fn meshes(&self) -> &MeshAnchorRegistry {
        &self.meshes
    }

    pub fn hands(&self) -> &LatestHands {
        &self.hands
    }

    pub fn immersive_space(&self) -> ImmersiveSpaceState {
        self.immersive_space
    }

    /// Start the experience if the device can run it
    ///
    /// Both providers must be supported and still in their initial state.
    pub fn start_session(&mut self, support: ProviderSupport) -> bool {
        if !support.all_supported() {
            log::error!(
                "Required data providers unavailable (hand tracking: {}, scene reconstruction: {})",
                support.hand_tracking,
                support.scene_reconstruction
            );
            return false;
        }
        if !self.session.providers().is_ready_to_run() {
            log::warn!("Data providers are not ready to run: {:?}", self.session.providers());
            return false;
        }
        self.open_immersive_space();
        true
    }

    /// Begin presenting; the space is open once the first frame runs
    pub fn open_immersive_space(&mut self) {
        if self.immersive_space == ImmersiveSpaceState::Closed {
            self.immersive_space = ImmersiveSpaceState::InTransition;
        }
    }

    /// Mark the space as visible
    pub fn immersive_space_appeared(&mut self) {
        self.immersive_space = ImmersiveSpaceState::Open;
    }

    /// Tear down the session: reconstructed geometry and the ball go away
    pub fn close_immersive_space(&mut self) {
        self.meshes.clear(&mut self.world);
        if let Some(ball) = self.ball.take() {
            self.world.remove_entity(ball);
        }
        self.grip.reset();
        self.immersive_space = ImmersiveSpaceState::Closed;
    }

    /// Create the ball at the right index fingertip
    ///
    /// Only one ball exists per session; later calls return the existing one.
    pub fn spawn_ball(&mut self) -> SpawnOutcome {
        if let Some(key) = self.ball.filter(|key| self.world.get_entity(*key).is_some()) {
            return SpawnOutcome::AlreadySpawned(key);
        }

        let Some(tip) = self
            .hands
            .right
            .as_ref()
            .and_then(|pose| pose.joint_world(JointId::IndexFingerTip))
        else {
            log::debug!("Spawn requested without a tracked right index fingertip");
            return SpawnOutcome::HandUnavailable;
        };

        let key = self.ball_spec.spawn(&mut self.world, tip.translation);
        self.ball = Some(key);
        SpawnOutcome::Spawned(key)
    }

    /// Record a hand pose and, for the driving hand, run grip detection
    pub fn handle_hand_update(&mut self, update: HandUpdate) -> Option<GripEvaluation> {
        let pose = self.hands.accept(update)?;
        if !self.grip.wants(pose.chirality) {
            return None;
        }
        let Some(mut ball) = self.ball.and_then(|key| BallHandle::new(&mut self.world, key)) else {
            // Nothing to hold
            self.grip.reset();
            return None;
        };
        Some(self.grip.evaluate(pose, &mut ball))
    }

    pub fn handle_mesh_change(&mut self, change: MeshChange) -> MeshOutcome {
        self.meshes.apply(&mut self.world, change)
    }

    pub fn handle_session_event(&mut self, event: &SessionEvent) {
        self.session.handle(event);
    }
}
