use super::Root;
use slotmap::SlotMap;
use std::collections::VecDeque;
use std::fmt;

slotmap::new_key_type! {
    pub struct ActionId;
}

/// Deferred callback. Returning `true` deallocates the action after it
/// fires; `false` keeps it allocated but unqueued.
pub type ActionFn = Box<dyn FnMut(&mut Root) -> bool>;

struct Action {
    time: f64,
    /// Taken out while the callback runs.
    callback: Option<ActionFn>,
    queued: bool,
}

/// Time-ordered queue of deferred actions, advanced by [`Root::update`].
#[derive(Default)]
pub struct ActionQueue {
    actions: SlotMap<ActionId, Action>,
    queue: VecDeque<ActionId>,
}

impl ActionQueue {
    pub fn alloc(&mut self, time: f64, callback: ActionFn) -> ActionId {
        self.actions.insert(Action {
            time,
            callback: Some(callback),
            queued: false,
        })
    }

    /// Queues `id` before the first action due at or after its time.
    /// Returns `false` if it is already queued or unknown.
    pub fn add(&mut self, id: ActionId) -> bool {
        let Some(action) = self.actions.get_mut(id) else {
            return false;
        };
        if action.queued {
            return false;
        }
        action.queued = true;
        let time = action.time;
        let at = self
            .queue
            .iter()
            .position(|&queued| self.actions.get(queued).is_some_and(|a| a.time >= time))
            .unwrap_or(self.queue.len());
        self.queue.insert(at, id);
        true
    }

    pub fn remove(&mut self, id: ActionId) -> bool {
        let Some(action) = self.actions.get_mut(id) else {
            return false;
        };
        if !action.queued {
            return false;
        }
        action.queued = false;
        self.queue.retain(|&queued| queued != id);
        true
    }

    /// Re-sorts `id` after its time changed, queueing it if it was not.
    pub fn modify(&mut self, id: ActionId) {
        let Some(action) = self.actions.get(id) else {
            return;
        };
        if !action.queued {
            self.add(id);
            return;
        }
        let time = action.time;
        let Some(at) = self.queue.iter().position(|&queued| queued == id) else {
            return;
        };
        let time_of = |slot: Option<&ActionId>| slot.and_then(|&q| self.actions.get(q)).map(|a| a.time);
        let after_prev = at == 0 || time_of(self.queue.get(at - 1)).is_none_or(|t| t <= time);
        let before_next = time_of(self.queue.get(at + 1)).is_none_or(|t| t >= time);
        if !(after_prev && before_next) {
            self.remove(id);
            self.add(id);
        }
    }

    pub fn dealloc(&mut self, id: ActionId) {
        self.remove(id);
        self.actions.remove(id);
    }

    pub fn time(&self, id: ActionId) -> Option<f64> {
        self.actions.get(id).map(|a| a.time)
    }

    /// Changes the due time without re-sorting; follow with
    /// [`ActionQueue::modify`] if the action is queued.
    pub fn set_time(&mut self, id: ActionId, time: f64) {
        if let Some(action) = self.actions.get_mut(id) {
            action.time = time;
        }
    }

    pub fn is_queued(&self, id: ActionId) -> bool {
        self.actions.get(id).is_some_and(|a| a.queued)
    }

    pub fn contains(&self, id: ActionId) -> bool {
        self.actions.contains_key(id)
    }

    pub fn queued(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.queue.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Unqueues and returns the front action if it is due at `now`.
    fn pop_due(&mut self, now: f64) -> Option<ActionId> {
        let &front = self.queue.front()?;
        let action = self.actions.get_mut(front)?;
        if action.time > now {
            return None;
        }
        action.queued = false;
        self.queue.pop_front();
        Some(front)
    }
}

impl fmt::Debug for ActionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionQueue")
            .field("allocated", &self.actions.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl Root {
    pub fn alloc_action(
        &mut self,
        time: f64,
        callback: impl FnMut(&mut Root) -> bool + 'static,
    ) -> ActionId {
        self.actions.alloc(time, Box::new(callback))
    }

    pub fn add_action(&mut self, id: ActionId) -> bool {
        self.actions.add(id)
    }

    pub fn remove_action(&mut self, id: ActionId) -> bool {
        self.actions.remove(id)
    }

    /// Sets a new due time and re-sorts the action.
    pub fn modify_action(&mut self, id: ActionId, time: f64) {
        self.actions.set_time(id, time);
        self.actions.modify(id);
    }

    pub fn dealloc_action(&mut self, id: ActionId) {
        self.actions.dealloc(id);
    }

    pub fn actions(&self) -> &ActionQueue {
        &self.actions
    }

    /// Advances the clock by `delta` seconds and fires every due action in
    /// queue order.
    pub fn update(&mut self, delta: f64) {
        self.time += delta;
        while let Some(id) = self.actions.pop_due(self.time) {
            let Some(mut callback) = self
                .actions
                .actions
                .get_mut(id)
                .and_then(|a| a.callback.take())
            else {
                continue;
            };
            tracing::trace!(?id, time = self.time, "deferred action fired");
            let done = callback(self);
            if done {
                self.actions.dealloc(id);
            } else if let Some(action) = self.actions.actions.get_mut(id) {
                action.callback = Some(callback);
            }
        }
    }
}
