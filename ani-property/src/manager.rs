//! # Manager 模块
//!
//! 动画管理器：对象侧表。
//!
//! 每个注册对象在管理器里有一份状态，包括宿主对象本身、它的类定义，
//! 以及按描述符类型懒创建的注册表与帧订阅：
//!
//! ```rust,ignore
//! let clock = FrameClock::new();
//! let mut manager = AnimationManager::new(clock.clone());
//!
//! let id = manager.register(Rc::new(Widget::new()), Rc::new(class));
//! manager.set_attr(id, "ani_width", AttrValue::Number(300.0))?;
//!
//! // 之后每帧
//! clock.tick(dt);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::class::ClassDef;
use crate::clock::{FrameClock, Trigger};
use crate::error::{AniError, AniResult};
use crate::object::{Animatable, ObjectId};
use crate::step::{
    ActiveEntry, MutableSequenceEntry, NumericEntry, Registry, SequenceEntry, Slot, update_step,
};
use crate::value::AttrValue;

/// 某个对象上某种描述符的注册表与帧订阅
pub(crate) struct Track<E> {
    registry: Registry<E>,
    trigger: Trigger,
}

impl<E: ActiveEntry> Track<E> {
    fn new(clock: &FrameClock, id: ObjectId, object: Rc<dyn Animatable>) -> Self {
        let registry: Registry<E> = Rc::default();
        let step_registry = Rc::clone(&registry);
        let trigger = clock
            .create_trigger(move |dt| update_step(id, object.as_ref(), &step_registry, dt));
        debug!(object = %id, kind = ?E::KIND, "创建帧订阅");
        Self { registry, trigger }
    }

    fn len(&self) -> usize {
        self.registry.borrow().len()
    }

    fn contains(&self, attr: &str) -> bool {
        self.registry.borrow().contains_key(attr)
    }
}

/// 对象的三类轨道（懒创建）
#[derive(Default)]
pub(crate) struct ObjectTracks {
    numeric: Option<Track<NumericEntry>>,
    mutable_sequence: Option<Track<MutableSequenceEntry>>,
    sequence: Option<Track<SequenceEntry>>,
}

impl ObjectTracks {
    fn active_count(&self) -> usize {
        self.numeric.as_ref().map_or(0, Track::len)
            + self.mutable_sequence.as_ref().map_or(0, Track::len)
            + self.sequence.as_ref().map_or(0, Track::len)
    }

    fn cancel_subscriptions(&self) {
        if let Some(track) = &self.numeric {
            track.trigger.cancel();
        }
        if let Some(track) = &self.mutable_sequence {
            track.trigger.cancel();
        }
        if let Some(track) = &self.sequence {
            track.trigger.cancel();
        }
    }
}

/// 按条目类型选出对应的轨道
pub(crate) trait Tracked: ActiveEntry {
    fn track(tracks: &ObjectTracks) -> Option<&Track<Self>>;
    fn track_mut(tracks: &mut ObjectTracks) -> &mut Option<Track<Self>>;
}

impl Tracked for NumericEntry {
    fn track(tracks: &ObjectTracks) -> Option<&Track<Self>> {
        tracks.numeric.as_ref()
    }

    fn track_mut(tracks: &mut ObjectTracks) -> &mut Option<Track<Self>> {
        &mut tracks.numeric
    }
}

impl Tracked for MutableSequenceEntry {
    fn track(tracks: &ObjectTracks) -> Option<&Track<Self>> {
        tracks.mutable_sequence.as_ref()
    }

    fn track_mut(tracks: &mut ObjectTracks) -> &mut Option<Track<Self>> {
        &mut tracks.mutable_sequence
    }
}

impl Tracked for SequenceEntry {
    fn track(tracks: &ObjectTracks) -> Option<&Track<Self>> {
        tracks.sequence.as_ref()
    }

    fn track_mut(tracks: &mut ObjectTracks) -> &mut Option<Track<Self>> {
        &mut tracks.sequence
    }
}

/// 已注册的对象
struct RegisteredObject {
    object: Rc<dyn Animatable>,
    class: Rc<ClassDef>,
    tracks: ObjectTracks,
}

/// 动画管理器
pub struct AnimationManager {
    clock: FrameClock,
    /// 已注册的对象（ObjectId -> 对象）
    objects: HashMap<ObjectId, RegisteredObject>,
    next_object_id: u64,
    next_serial: u64,
}

impl fmt::Debug for AnimationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationManager")
            .field("objects", &self.objects.len())
            .field("animations", &self.active_count())
            .finish()
    }
}

impl AnimationManager {
    /// 创建新的管理器，帧订阅挂在给定的时钟上
    pub fn new(clock: FrameClock) -> Self {
        Self {
            clock,
            objects: HashMap::new(),
            next_object_id: 1,
            next_serial: 1,
        }
    }

    /// 驱动动画的帧时钟
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    fn next_object_id(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next_object_id);
        self.next_object_id += 1;
        id
    }

    // ========== 对象管理 ==========

    /// 注册宿主对象
    ///
    /// 系统分配唯一的 `ObjectId` 并返回，后续通过此 ID 引用对象。
    pub fn register<T: Animatable>(&mut self, object: Rc<T>, class: Rc<ClassDef>) -> ObjectId {
        let id = self.next_object_id();
        debug!(object = %id, class = class.name(), "注册对象");
        self.objects.insert(
            id,
            RegisteredObject {
                object: object as Rc<dyn Animatable>,
                class,
                tracks: ObjectTracks::default(),
            },
        );
        id
    }

    /// 注销对象
    ///
    /// 丢弃对象的注册表，并从时钟上移除它的帧订阅。
    pub fn unregister(&mut self, id: ObjectId) -> bool {
        match self.objects.remove(&id) {
            Some(registered) => {
                registered.tracks.cancel_subscriptions();
                debug!(object = %id, "注销对象");
                true
            }
            None => false,
        }
    }

    /// 检查对象是否已注册
    pub fn is_registered(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// 获取已注册对象数量
    pub fn registered_count(&self) -> usize {
        self.objects.len()
    }

    /// 对象的类定义
    pub fn class_of(&self, id: ObjectId) -> AniResult<&Rc<ClassDef>> {
        self.registered(id).map(|r| &r.class)
    }

    /// 宿主对象
    pub fn object(&self, id: ObjectId) -> AniResult<&Rc<dyn Animatable>> {
        self.registered(id).map(|r| &r.object)
    }

    fn registered(&self, id: ObjectId) -> AniResult<&RegisteredObject> {
        self.objects.get(&id).ok_or(AniError::ObjectNotFound(id))
    }

    // ========== 属性访问 ==========

    /// 读取属性
    ///
    /// 名称对应类上的描述符时走描述符，否则直接读宿主对象。
    pub fn get_attr(&self, id: ObjectId, name: &str) -> AniResult<AttrValue> {
        let class = Rc::clone(self.class_of(id)?);
        match class.descriptor(name) {
            Some(descriptor) => descriptor.get(self, id),
            None => self.read_target(id, name),
        }
    }

    /// 写入属性
    ///
    /// 名称对应类上的描述符时登记目标值，否则直接写宿主对象。
    pub fn set_attr(&mut self, id: ObjectId, name: &str, value: AttrValue) -> AniResult<()> {
        let class = Rc::clone(self.class_of(id)?);
        match class.descriptor(name) {
            Some(descriptor) => descriptor.set(self, id, value),
            None => {
                if self.object(id)?.set_attr(name, value) {
                    Ok(())
                } else {
                    Err(AniError::WriteRejected {
                        object: id,
                        attr: name.to_string(),
                    })
                }
            }
        }
    }

    /// 直接读取宿主对象上的真实属性
    pub(crate) fn read_target(&self, id: ObjectId, attr: &str) -> AniResult<AttrValue> {
        self.object(id)?
            .get_attr(attr)
            .ok_or_else(|| AniError::AttributeMissing {
                object: id,
                attr: attr.to_string(),
            })
    }

    /// 有活跃条目时返回目标值，否则返回真实属性
    pub(crate) fn read_through<E: Tracked>(&self, id: ObjectId, attr: &str) -> AniResult<AttrValue> {
        let registered = self.registered(id)?;
        let goal = E::track(&registered.tracks)
            .and_then(|track| track.registry.borrow().get(attr).map(|slot| slot.entry.goal()));
        match goal {
            Some(goal) => Ok(goal),
            None => self.read_target(id, attr),
        }
    }

    // ========== 动画控制 ==========

    /// 登记（或覆盖）条目并激活帧订阅
    ///
    /// 覆盖时从真实属性的当前值重新开始，不会同步修改真实属性。
    pub(crate) fn start<E: Tracked>(&mut self, id: ObjectId, attr: &str, entry: E) -> AniResult<()> {
        let serial = self.next_serial;
        self.next_serial += 1;

        let clock = self.clock.clone();
        let registered = self
            .objects
            .get_mut(&id)
            .ok_or(AniError::ObjectNotFound(id))?;
        let object = Rc::clone(&registered.object);
        let track =
            E::track_mut(&mut registered.tracks).get_or_insert_with(|| Track::new(&clock, id, object));

        track
            .registry
            .borrow_mut()
            .insert(attr.to_string(), Slot { serial, entry });
        track.trigger.arm();
        Ok(())
    }

    /// 取消某种描述符驱动的单个属性动画
    pub(crate) fn cancel_entry<E: Tracked>(&self, id: ObjectId, attr: &str) -> bool {
        let Some(registered) = self.objects.get(&id) else {
            return false;
        };
        let removed = E::track(&registered.tracks)
            .is_some_and(|track| track.registry.borrow_mut().shift_remove(attr).is_some());
        if removed {
            debug!(object = %id, attr, kind = ?E::KIND, "取消动画");
        }
        removed
    }

    /// 取消对象上某个真实属性的动画
    ///
    /// 真实属性停在当前值。没有对应动画（或对象从未动画过）时什么也不做。
    ///
    /// # 返回
    /// 是否确实移除了条目
    pub fn cancel(&self, id: ObjectId, attr: &str) -> bool {
        // 三个都要执行，不能短路
        let numeric = self.cancel_entry::<NumericEntry>(id, attr);
        let mutable = self.cancel_entry::<MutableSequenceEntry>(id, attr);
        let sequence = self.cancel_entry::<SequenceEntry>(id, attr);
        numeric || mutable || sequence
    }

    /// 取消对象上的所有动画
    pub fn cancel_all(&self, id: ObjectId) {
        if let Some(registered) = self.objects.get(&id) {
            let tracks = &registered.tracks;
            if let Some(track) = &tracks.numeric {
                track.registry.borrow_mut().clear();
            }
            if let Some(track) = &tracks.mutable_sequence {
                track.registry.borrow_mut().clear();
            }
            if let Some(track) = &tracks.sequence {
                track.registry.borrow_mut().clear();
            }
        }
    }

    // ========== 查询 ==========

    /// 对象的某个真实属性是否正在动画
    pub fn is_animating(&self, id: ObjectId, attr: &str) -> bool {
        let Some(registered) = self.objects.get(&id) else {
            return false;
        };
        let tracks = &registered.tracks;
        tracks.numeric.as_ref().is_some_and(|t| t.contains(attr))
            || tracks.mutable_sequence.as_ref().is_some_and(|t| t.contains(attr))
            || tracks.sequence.as_ref().is_some_and(|t| t.contains(attr))
    }

    /// 对象是否有任何动画
    pub fn has_object_animations(&self, id: ObjectId) -> bool {
        self.objects
            .get(&id)
            .is_some_and(|r| r.tracks.active_count() > 0)
    }

    /// 所有对象的活跃条目数量
    pub fn active_count(&self) -> usize {
        self.objects.values().map(|r| r.tracks.active_count()).sum()
    }

    /// 是否有任何活跃动画
    pub fn has_active_animations(&self) -> bool {
        self.active_count() > 0
    }
}
