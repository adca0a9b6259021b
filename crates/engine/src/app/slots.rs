use std::fmt;

use crate::anim::Animation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotId {
    Box1,
    Box2,
}

impl SlotId {
    pub const ALL: [SlotId; 2] = [SlotId::Box1, SlotId::Box2];

    /// Name shown on screen and used as the remembered-path store key.
    pub const fn name(self) -> &'static str {
        match self {
            SlotId::Box1 => "box1",
            SlotId::Box2 => "box2",
        }
    }

    const fn index(self) -> usize {
        match self {
            SlotId::Box1 => 0,
            SlotId::Box2 => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Active,
    Peer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tint(pub [u8; 3]);

impl Tint {
    pub const ACTING: Tint = Tint([102, 51, 204]);
    pub const IDLE: Tint = Tint([51, 25, 102]);

    pub const fn for_role(role: Role) -> Tint {
        match role {
            Role::Active => Tint::ACTING,
            Role::Peer => Tint::IDLE,
        }
    }
}

pub struct EntitySlot {
    id: SlotId,
    animation: Option<Box<dyn Animation>>,
    source_path: String,
    role: Role,
    tint: Tint,
    /// Sequence number of the newest load result applied to this slot.
    pub(crate) resolved_seq: u64,
}

impl EntitySlot {
    fn new(id: SlotId, role: Role) -> Self {
        Self {
            id,
            animation: None,
            source_path: String::new(),
            role,
            tint: Tint::for_role(role),
            resolved_seq: 0,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn is_loaded(&self) -> bool {
        self.animation.is_some()
    }

    pub fn animation(&self) -> Option<&dyn Animation> {
        self.animation.as_deref()
    }

    pub fn animation_mut(&mut self) -> Option<&mut (dyn Animation + 'static)> {
        self.animation.as_deref_mut()
    }

    /// Directory of the animation currently installed, empty before the
    /// first successful load.
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn tint(&self) -> Tint {
        self.tint
    }

    /// Replaces the animation and its source path together.
    pub(crate) fn install(&mut self, animation: Box<dyn Animation>, source_path: String) {
        self.animation = Some(animation);
        self.source_path = source_path;
    }

    fn set_role(&mut self, role: Role) {
        self.role = role;
        self.tint = Tint::for_role(role);
    }
}

impl fmt::Debug for EntitySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySlot")
            .field("id", &self.id)
            .field("loaded", &self.is_loaded())
            .field("source_path", &self.source_path)
            .field("role", &self.role)
            .field("tint", &self.tint)
            .field("resolved_seq", &self.resolved_seq)
            .finish()
    }
}

/// The two preview slots. Exactly one holds [`Role::Active`]; roles are
/// looked up each time rather than cached.
#[derive(Debug)]
pub struct EntitySlots {
    slots: [EntitySlot; 2],
}

impl Default for EntitySlots {
    fn default() -> Self {
        Self::new()
    }
}

impl EntitySlots {
    pub fn new() -> Self {
        Self {
            slots: [
                EntitySlot::new(SlotId::Box1, Role::Active),
                EntitySlot::new(SlotId::Box2, Role::Peer),
            ],
        }
    }

    pub fn get(&self, id: SlotId) -> &EntitySlot {
        &self.slots[id.index()]
    }

    pub fn get_mut(&mut self, id: SlotId) -> &mut EntitySlot {
        &mut self.slots[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntitySlot> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EntitySlot> {
        self.slots.iter_mut()
    }

    pub fn active(&self) -> &EntitySlot {
        &self.slots[self.active_index()]
    }

    pub fn peer(&self) -> &EntitySlot {
        &self.slots[1 - self.active_index()]
    }

    pub fn active_and_peer_mut(&mut self) -> (&mut EntitySlot, &mut EntitySlot) {
        let active_index = self.active_index();
        let (first, second) = self.slots.split_at_mut(1);
        if active_index == 0 {
            (&mut first[0], &mut second[0])
        } else {
            (&mut second[0], &mut first[0])
        }
    }

    /// Makes `id` the active slot. Returns whether roles changed.
    pub fn select(&mut self, id: SlotId) -> bool {
        if self.active().id() == id {
            return false;
        }
        self.swap_roles();
        true
    }

    pub fn swap_roles(&mut self) {
        for slot in &mut self.slots {
            let role = match slot.role {
                Role::Active => Role::Peer,
                Role::Peer => Role::Active,
            };
            slot.set_role(role);
        }
    }

    fn active_index(&self) -> usize {
        if self.slots[0].role == Role::Active {
            0
        } else {
            1
        }
    }
}
