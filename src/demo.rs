//! A small simulated scene that the terminal host inspects.
//!
//! `Player` and `Enemy` both embed an `Actor` base and target each other,
//! so the graph is cyclic.  Statics live in process-wide atomics, a saved
//! `Preset` asset shows that persistent objects get no debug view, and
//! [`World::tick`] keeps values moving between redraws.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Mutex;

use crate::core::reflect::{FieldDesc, Handle, Inspect, InspectList, ListHandle, ReadOnlyList, StaticFields, TypeDesc, UntypedList};
use crate::core::value::{AssetRef, AssetType, Color, EnumDesc, FieldType, FloatKind, IntKind, Value, Vector};

// ───────────────────────────────────────── assets ────────────

pub static ASSET: AssetType = AssetType {
    name: "Asset",
    base: None,
};
pub static TEXTURE: AssetType = AssetType {
    name: "Texture",
    base: Some(&ASSET),
};
pub static TEXTURE_2D: AssetType = AssetType {
    name: "Texture2D",
    base: Some(&TEXTURE),
};
pub static MATERIAL: AssetType = AssetType {
    name: "Material",
    base: Some(&ASSET),
};

/// Every asset a reference field can be pointed at, in picker order.
pub fn asset_catalog() -> Vec<AssetRef> {
    vec![
        AssetRef::new(&TEXTURE_2D, "Grass"),
        AssetRef::new(&TEXTURE_2D, "Cobblestone"),
        AssetRef::new(&TEXTURE, "Skybox"),
        AssetRef::new(&MATERIAL, "Rusted Metal"),
    ]
}

pub static TEAM: EnumDesc = EnumDesc {
    name: "Team",
    variants: &["Neutral", "Red", "Blue"],
};

fn shared<L: InspectList>(list: &Rc<RefCell<L>>) -> ListHandle {
    list.clone()
}

// ───────────────────────────────────────── actor (base) ──────

const MAX_ACTORS: i128 = 64;

static SPAWNED: AtomicU32 = AtomicU32::new(0);

struct ActorStatics;

impl StaticFields for ActorStatics {
    fn get(&self, name: &str) -> Option<Value> {
        match name {
            "spawned" => Some(Value::Int(SPAWNED.load(Ordering::Relaxed).into())),
            "MAX_ACTORS" => Some(Value::Int(MAX_ACTORS)),
            _ => None,
        }
    }

    fn set(&self, name: &str, value: Value) {
        if let ("spawned", Value::Int(n)) = (name, value) {
            SPAWNED.store(IntKind::U32.clamp(n) as u32, Ordering::Relaxed);
        }
    }
}

static ACTOR_STATICS: ActorStatics = ActorStatics;

static ACTOR_FIELDS: [FieldDesc; 5] = [
    FieldDesc::private("id", FieldType::Int(IntKind::U32)),
    FieldDesc::public("name", FieldType::Text),
    FieldDesc::public("position", FieldType::Vector(3)),
    FieldDesc::public("spawned", FieldType::Int(IntKind::U32)).shared(),
    FieldDesc::public("MAX_ACTORS", FieldType::Int(IntKind::I64)).constant(),
];

pub static ACTOR: TypeDesc = TypeDesc {
    name: "Actor",
    base: None,
    fields: &ACTOR_FIELDS,
    statics: Some(&ACTOR_STATICS),
};

pub struct Actor {
    id: u32,
    pub name: String,
    pub position: [f32; 3],
}

impl Actor {
    pub fn new(name: &str) -> Self {
        let id = SPAWNED.fetch_add(1, Ordering::Relaxed) + 1;
        Self {
            id,
            name: name.to_string(),
            position: [0.0; 3],
        }
    }
}

impl Inspect for Actor {
    fn type_desc(&self) -> &'static TypeDesc {
        &ACTOR
    }

    fn get(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Int(self.id.into())),
            "name" => Some(Value::Text(self.name.clone())),
            "position" => Some(Value::Vector(Vector::V3(self.position))),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: Value) {
        match (name, value) {
            ("id", Value::Int(id)) => self.id = IntKind::U32.clamp(id) as u32,
            ("name", Value::Text(text)) => self.name = text,
            ("position", Value::Vector(Vector::V3(p))) => self.position = p,
            _ => {}
        }
    }
}

// ───────────────────────────────────────── player ────────────

static HIGH_SCORE: AtomicI64 = AtomicI64::new(0);
static SESSION_TAG: Mutex<String> = Mutex::new(String::new());

struct PlayerStatics;

impl StaticFields for PlayerStatics {
    fn get(&self, name: &str) -> Option<Value> {
        match name {
            "high_score" => Some(Value::Int(HIGH_SCORE.load(Ordering::Relaxed).into())),
            "session_tag" => SESSION_TAG.lock().ok().map(|tag| Value::Text(tag.clone())),
            _ => None,
        }
    }

    fn set(&self, name: &str, value: Value) {
        match (name, value) {
            ("high_score", Value::Int(n)) => HIGH_SCORE.store(IntKind::I64.clamp(n) as i64, Ordering::Relaxed),
            ("session_tag", Value::Text(text)) => {
                if let Ok(mut tag) = SESSION_TAG.lock() {
                    *tag = text;
                }
            }
            _ => {}
        }
    }
}

static PLAYER_STATICS: PlayerStatics = PlayerStatics;

static PLAYER_FIELDS: [FieldDesc; 13] = [
    FieldDesc::private("stamina", FieldType::Float(FloatKind::F32)),
    FieldDesc::private("tags", FieldType::List(None)),
    FieldDesc::private("native_handle", FieldType::Unsupported("NativeHandle")),
    FieldDesc::public("health", FieldType::Int(IntKind::U8)),
    FieldDesc::public("invulnerable", FieldType::Bool),
    FieldDesc::public("team", FieldType::Enum(&TEAM)),
    FieldDesc::public("tint", FieldType::Color),
    FieldDesc::public("avatar", FieldType::Reference(&TEXTURE)),
    FieldDesc::public("target", FieldType::Object("Actor")),
    FieldDesc::public("inventory", FieldType::List(Some(&FieldType::Text))),
    FieldDesc::public("recent_damage", FieldType::List(Some(&FieldType::Int(IntKind::I16)))),
    FieldDesc::public("high_score", FieldType::Int(IntKind::I64)).shared(),
    FieldDesc::private("session_tag", FieldType::Text).shared(),
];

pub static PLAYER: TypeDesc = TypeDesc {
    name: "Player",
    base: Some(&ACTOR),
    fields: &PLAYER_FIELDS,
    statics: Some(&PLAYER_STATICS),
};

pub struct Player {
    pub actor: Actor,
    pub stamina: f32,
    pub tags: ListHandle,
    native_handle: u64,
    pub health: u8,
    pub invulnerable: bool,
    pub team: usize,
    pub tint: Color,
    pub avatar: Option<AssetRef>,
    pub target: Option<Handle>,
    pub inventory: ListHandle,
    pub recent_damage: Rc<RefCell<[i16; 4]>>,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Self {
            actor: Actor::new(name),
            stamina: 100.0,
            tags: Rc::new(RefCell::new(UntypedList(vec![
                Value::Text("spawned-at-origin".into()),
                Value::Int(3),
            ]))),
            native_handle: 0x7f3a_0010,
            health: 100,
            invulnerable: false,
            team: 1,
            tint: Color::rgba(0.9, 0.3, 0.2, 1.0),
            avatar: Some(AssetRef::new(&TEXTURE_2D, "Grass")),
            target: None,
            inventory: Rc::new(RefCell::new(vec!["sword".to_string(), "potion".to_string()])),
            recent_damage: Rc::new(RefCell::new([0; 4])),
        }
    }
}

impl Inspect for Player {
    fn type_desc(&self) -> &'static TypeDesc {
        &PLAYER
    }

    fn get(&self, name: &str) -> Option<Value> {
        let value = match name {
            "stamina" => Value::Float(self.stamina.into()),
            "tags" => Value::List(Some(self.tags.clone())),
            "native_handle" => Value::Opaque(format!("{:#010x}", self.native_handle)),
            "health" => Value::Int(self.health.into()),
            "invulnerable" => Value::Bool(self.invulnerable),
            "team" => Value::Enum(self.team),
            "tint" => Value::Color(self.tint),
            "avatar" => Value::Reference(self.avatar.clone()),
            "target" => Value::Object(self.target.clone()),
            "inventory" => Value::List(Some(self.inventory.clone())),
            "recent_damage" => Value::List(Some(shared(&self.recent_damage))),
            _ => return self.actor.get(name),
        };
        Some(value)
    }

    fn set(&mut self, name: &str, value: Value) {
        match (name, value) {
            ("stamina", Value::Float(f)) => self.stamina = f as f32,
            ("health", Value::Int(n)) => self.health = IntKind::U8.clamp(n) as u8,
            ("invulnerable", Value::Bool(b)) => self.invulnerable = b,
            ("team", Value::Enum(i)) => self.team = i,
            ("tint", Value::Color(c)) => self.tint = c,
            ("avatar", Value::Reference(r)) => self.avatar = r,
            ("target", Value::Object(t)) => self.target = t,
            // List handles are edited in place; the field itself never changes.
            ("tags" | "inventory" | "recent_damage" | "native_handle", _) => {}
            (name, value) => self.actor.set(name, value),
        }
    }
}

// ───────────────────────────────────────── enemy ─────────────

static ENEMY_FIELDS: [FieldDesc; 6] = [
    FieldDesc::private("patrol_step", FieldType::Int(IntKind::U16)),
    FieldDesc::public("aggressive", FieldType::Bool),
    FieldDesc::public("speed", FieldType::Float(FloatKind::F64)),
    FieldDesc::public("target", FieldType::Object("Actor")),
    FieldDesc::public("minions", FieldType::List(Some(&FieldType::Object("Enemy")))),
    FieldDesc::public("loot", FieldType::List(Some(&FieldType::Int(IntKind::U16)))),
];

pub static ENEMY: TypeDesc = TypeDesc {
    name: "Enemy",
    base: Some(&ACTOR),
    fields: &ENEMY_FIELDS,
    statics: None,
};

pub struct Enemy {
    pub actor: Actor,
    pub patrol_step: u16,
    pub aggressive: bool,
    pub speed: f64,
    pub target: Option<Handle>,
    pub minions: Rc<RefCell<Vec<Option<Handle>>>>,
    pub loot: Rc<RefCell<ReadOnlyList<u16>>>,
}

impl Enemy {
    pub fn new(name: &str) -> Self {
        Self {
            actor: Actor::new(name),
            patrol_step: 0,
            aggressive: false,
            speed: 1.5,
            target: None,
            minions: Rc::new(RefCell::new(Vec::new())),
            loot: Rc::new(RefCell::new(ReadOnlyList(vec![10, 250]))),
        }
    }
}

impl Inspect for Enemy {
    fn type_desc(&self) -> &'static TypeDesc {
        &ENEMY
    }

    fn get(&self, name: &str) -> Option<Value> {
        let value = match name {
            "patrol_step" => Value::Int(self.patrol_step.into()),
            "aggressive" => Value::Bool(self.aggressive),
            "speed" => Value::Float(self.speed),
            "target" => Value::Object(self.target.clone()),
            "minions" => Value::List(Some(shared(&self.minions))),
            "loot" => Value::List(Some(shared(&self.loot))),
            _ => return self.actor.get(name),
        };
        Some(value)
    }

    fn set(&mut self, name: &str, value: Value) {
        match (name, value) {
            ("patrol_step", Value::Int(n)) => self.patrol_step = IntKind::U16.clamp(n) as u16,
            ("aggressive", Value::Bool(b)) => self.aggressive = b,
            ("speed", Value::Float(f)) => self.speed = f,
            ("target", Value::Object(t)) => self.target = t,
            ("minions" | "loot", _) => {}
            (name, value) => self.actor.set(name, value),
        }
    }
}

// ───────────────────────────────────────── saved preset ──────

static PRESET_FIELDS: [FieldDesc; 1] = [FieldDesc::public("volume", FieldType::Float(FloatKind::F32))];

pub static PRESET: TypeDesc = TypeDesc {
    name: "Preset",
    base: None,
    fields: &PRESET_FIELDS,
    statics: None,
};

/// A saved asset rather than a live instance.
pub struct Preset {
    pub volume: f32,
}

impl Inspect for Preset {
    fn type_desc(&self) -> &'static TypeDesc {
        &PRESET
    }

    fn get(&self, name: &str) -> Option<Value> {
        (name == "volume").then(|| Value::Float(self.volume.into()))
    }

    fn set(&mut self, name: &str, value: Value) {
        if let ("volume", Value::Float(f)) = (name, value) {
            self.volume = f as f32;
        }
    }

    fn is_persistent(&self) -> bool {
        true
    }
}

// ───────────────────────────────────────── world ─────────────

/// One inspectable component in the scene.
#[derive(Clone)]
pub struct Root {
    pub name: &'static str,
    pub handle: Handle,
}

pub struct World {
    player: Rc<RefCell<Player>>,
    enemy: Rc<RefCell<Enemy>>,
    minion: Rc<RefCell<Enemy>>,
    preset: Rc<RefCell<Preset>>,
    ticks: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        let player = Rc::new(RefCell::new(Player::new("Hero")));
        let enemy = Rc::new(RefCell::new(Enemy::new("Brute")));
        let minion = Rc::new(RefCell::new(Enemy::new("Imp")));

        let player_handle: Handle = player.clone();
        let enemy_handle: Handle = enemy.clone();
        let minion_handle: Handle = minion.clone();

        player.borrow_mut().target = Some(enemy_handle);
        {
            let mut brute = enemy.borrow_mut();
            brute.target = Some(player_handle.clone());
            brute.minions.borrow_mut().extend([Some(minion_handle), None]);
        }
        minion.borrow_mut().target = Some(player_handle);

        Self {
            player,
            enemy,
            minion,
            preset: Rc::new(RefCell::new(Preset { volume: 0.8 })),
            ticks: 0,
        }
    }

    pub fn roots(&self) -> Vec<Root> {
        vec![
            Root {
                name: "Player",
                handle: self.player.clone(),
            },
            Root {
                name: "Enemy",
                handle: self.enemy.clone(),
            },
            Root {
                name: "Preset",
                handle: self.preset.clone(),
            },
        ]
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the simulation by one step.
    pub fn tick(&mut self) {
        self.ticks += 1;
        let t = self.ticks as f32 * 0.1;

        if let Ok(mut player) = self.player.try_borrow_mut() {
            player.actor.position = [t.sin() * 5.0, 0.0, t.cos() * 5.0];
            player.stamina = if player.stamina <= 0.0 { 100.0 } else { player.stamina - 0.5 };
            if self.ticks % 25 == 0 {
                let hit = (self.ticks % 7) as i16 + 1;
                {
                    let mut damage = player.recent_damage.borrow_mut();
                    damage.rotate_right(1);
                    damage[0] = hit;
                }
                if !player.invulnerable {
                    player.health = player.health.saturating_sub(hit as u8);
                }
            }
            let score = HIGH_SCORE.load(Ordering::Relaxed).max(self.ticks as i64 / 10);
            HIGH_SCORE.store(score, Ordering::Relaxed);
        }

        if let Ok(mut enemy) = self.enemy.try_borrow_mut() {
            let [x, _, z] = self.player.try_borrow().map(|p| p.actor.position).unwrap_or_default();
            enemy.actor.position = [x * 0.5, 0.0, z * 0.5];
            enemy.aggressive = (x * x + z * z).sqrt() < 3.0;
            enemy.speed = if enemy.aggressive { 4.0 } else { 1.5 };
        }

        if let Ok(mut minion) = self.minion.try_borrow_mut() {
            minion.patrol_step = minion.patrol_step.wrapping_add(1) % 8;
        }
    }
}

impl Drop for World {
    fn drop(&mut self) {
        // Break the reference cycles so the graph is freed.
        if let Ok(mut player) = self.player.try_borrow_mut() {
            player.target = None;
        }
        for enemy in [&self.enemy, &self.minion] {
            if let Ok(mut enemy) = enemy.try_borrow_mut() {
                enemy.target = None;
                enemy.minions.borrow_mut().clear();
            }
        }
    }
}
