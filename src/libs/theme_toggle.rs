use crate::libs::dom::{
    require_element,
    BindError,
    ColorSchemePreference,
    Document,
    Element,
    DARK_CLASS,
    HIDDEN_CLASS,
};
use crate::libs::storage::{ Storage, THEME_KEY };
use crate::libs::theme::Theme;
use crossbeam_channel::Receiver;
use log::{ debug, info, warn };
use std::cell::{ Cell, RefCell };
use std::rc::Rc;

pub const THEME_TOGGLE_ID: &str = "theme-toggle";
pub const DARK_ICON_ID: &str = "theme-toggle-dark-icon";
pub const LIGHT_ICON_ID: &str = "theme-toggle-light-icon";

/// The `theme-switch` notification: the theme the page just switched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSwitch {
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Returns false once it wants no further notifications.
type Observer = Box<dyn FnMut(ThemeSwitch) -> bool>;

/// Dark/light switch for one page.
///
/// Owns its observers: widgets that re-render on a theme change (syntax
/// highlighting, charts) subscribe here rather than on a global event bus.
pub struct ThemeToggle {
    root: Rc<dyn Element>,
    button: Rc<dyn Element>,
    dark_icon: Rc<dyn Element>,
    light_icon: Rc<dyn Element>,
    storage: Rc<dyn Storage>,
    preference: Rc<dyn ColorSchemePreference>,
    observers: RefCell<Vec<(SubscriptionId, Observer)>>,
    running: RefCell<Vec<SubscriptionId>>,
    cancelled: RefCell<Vec<SubscriptionId>>,
    next_id: Cell<u64>,
}

impl ThemeToggle {
    /// Fails before touching anything if one of the toggle's elements is missing.
    pub fn bind(
        document: &dyn Document,
        storage: Rc<dyn Storage>,
        preference: Rc<dyn ColorSchemePreference>
    ) -> Result<Self, BindError> {
        let dark_icon = require_element(document, DARK_ICON_ID)?;
        let light_icon = require_element(document, LIGHT_ICON_ID)?;
        let button = require_element(document, THEME_TOGGLE_ID)?;

        Ok(Self {
            root: document.root(),
            button,
            dark_icon,
            light_icon,
            storage,
            preference,
            observers: RefCell::new(Vec::new()),
            running: RefCell::new(Vec::new()),
            cancelled: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        })
    }

    /// The button element, for the host to route clicks to [`ThemeToggle::toggle`]
    pub fn button(&self) -> &Rc<dyn Element> {
        &self.button
    }

    pub fn current(&self) -> Theme {
        Theme::from_root(&*self.root)
    }

    /// Resolves the starting theme (stored choice, then OS preference, then
    /// light), applies it to the root and reveals the icon that switches away
    /// from it.
    pub fn initialize(&self) -> Theme {
        let theme = match self.stored_theme() {
            Some(stored) => stored,
            None if self.preference.prefers_dark() => Theme::Dark,
            None => Theme::default(),
        };

        self.apply(theme);
        match theme {
            Theme::Dark => self.light_icon.remove_class(HIDDEN_CLASS),
            Theme::Light => self.dark_icon.remove_class(HIDDEN_CLASS),
        }

        info!("🎨 Initial theme: {}", theme);
        theme
    }

    /// Click handler. The next theme is the opposite of the stored one, or of
    /// what the root shows when nothing usable is stored.
    pub fn toggle(&self) -> Theme {
        self.dark_icon.toggle_class(HIDDEN_CLASS);
        self.light_icon.toggle_class(HIDDEN_CLASS);

        let next = self.stored_theme().unwrap_or_else(|| self.current()).toggled();

        self.apply(next);
        // Persisted before observers run, so a toggle from inside one reads it.
        if let Err(e) = self.storage.set(THEME_KEY, next.as_str()) {
            warn!("⚠️ Failed to persist theme '{}': {}", next, e);
        }
        info!("🎨 Theme switched to {}", next);

        self.notify(next);
        next
    }

    /// Registers an observer called once per toggle with the new theme.
    pub fn subscribe(&self, mut observer: impl FnMut(ThemeSwitch) + 'static) -> SubscriptionId {
        self.register(
            Box::new(move |event: ThemeSwitch| {
                observer(event);
                true
            })
        )
    }

    /// Returns false if the id is not subscribed (anymore).
    ///
    /// An observer removed while a notification is running is skipped for
    /// the rest of it, like `removeEventListener` during dispatch.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        {
            let mut observers = self.observers.borrow_mut();
            let before = observers.len();
            observers.retain(|(existing, _)| *existing != id);
            if observers.len() != before {
                return true;
            }
        }
        // Observers being notified are out of the list until the run finishes.
        if self.running.borrow().contains(&id) {
            let mut cancelled = self.cancelled.borrow_mut();
            if !cancelled.contains(&id) {
                cancelled.push(id);
                return true;
            }
        }
        false
    }

    /// A typed channel fed by every toggle. The subscription ends by itself
    /// once the receiver is dropped, or through [`ThemeToggle::unsubscribe`].
    pub fn channel(&self) -> (SubscriptionId, Receiver<ThemeSwitch>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let id = self.register(Box::new(move |event: ThemeSwitch| tx.send(event).is_ok()));
        (id, rx)
    }

    /// Subscriptions currently registered, not counting ones removed mid-notification
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len() + self.running.borrow().len() - self.cancelled.borrow().len()
    }

    fn register(&self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.observers.borrow_mut().push((id, observer));
        id
    }

    fn stored_theme(&self) -> Option<Theme> {
        match self.storage.get(THEME_KEY) {
            Ok(Some(value)) =>
                match value.parse() {
                    Ok(theme) => Some(theme),
                    Err(_) => {
                        warn!("⚠️ Ignoring unknown stored theme '{}'", value);
                        None
                    }
                }
            Ok(None) => None,
            Err(e) => {
                debug!("Theme preference unavailable: {}", e);
                None
            }
        }
    }

    fn apply(&self, theme: Theme) {
        if theme.is_dark() {
            self.root.add_class(DARK_CLASS);
        } else {
            self.root.remove_class(DARK_CLASS);
        }
    }

    fn notify(&self, theme: Theme) {
        let event = ThemeSwitch { theme };
        // Taken out so observers may subscribe, unsubscribe or toggle while being called.
        let mut batch = self.observers.take();
        let ids: Vec<SubscriptionId> = batch.iter().map(|(id, _)| *id).collect();
        self.running.borrow_mut().extend(ids.iter().copied());

        for (id, observer) in batch.iter_mut() {
            if self.cancelled.borrow().contains(id) {
                continue;
            }
            if !observer(event) {
                debug!("Dropping finished theme observer {:?}", id);
                self.cancelled.borrow_mut().push(*id);
            }
        }

        let finished: Vec<SubscriptionId> = {
            let mut cancelled = self.cancelled.borrow_mut();
            let (ours, outer): (Vec<_>, Vec<_>) = cancelled
                .drain(..)
                .partition(|id| ids.contains(id));
            *cancelled = outer;
            ours
        };
        self.running.borrow_mut().retain(|id| !ids.contains(id));
        batch.retain(|(id, _)| !finished.contains(id));

        // Subscriptions made during the run go after the existing ones.
        let mut observers = self.observers.borrow_mut();
        batch.append(&mut observers);
        *observers = batch;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::dom::{ StaticPreference, VirtualDocument };
    use crate::libs::storage::MemoryStorage;

    fn page(
        storage: MemoryStorage,
        preference: StaticPreference
    ) -> (VirtualDocument, Rc<MemoryStorage>, ThemeToggle) {
        let document = VirtualDocument::with_blog_chrome();
        let storage = Rc::new(storage);
        let toggle = ThemeToggle::bind(&document, storage.clone(), Rc::new(preference)).unwrap();
        (document, storage, toggle)
    }

    fn hidden(document: &VirtualDocument, id: &str) -> bool {
        document.element(id).unwrap().has_class(HIDDEN_CLASS)
    }

    #[test]
    fn stored_preference_wins() {
        let (document, _, toggle) = page(
            MemoryStorage::new().with_entry(THEME_KEY, "light"),
            StaticPreference::dark()
        );
        assert_eq!(toggle.initialize(), Theme::Light);
        assert!(!document.root_element().has_class(DARK_CLASS));
        assert!(!hidden(&document, DARK_ICON_ID));
        assert!(hidden(&document, LIGHT_ICON_ID));
    }

    #[test]
    fn os_preference_used_without_stored_value() {
        let (document, _, toggle) = page(MemoryStorage::new(), StaticPreference::dark());
        assert_eq!(toggle.initialize(), Theme::Dark);
        assert!(document.root_element().has_class(DARK_CLASS));
        assert!(!hidden(&document, LIGHT_ICON_ID));
        assert!(hidden(&document, DARK_ICON_ID));
    }

    #[test]
    fn defaults_to_light() {
        let (_, _, toggle) = page(MemoryStorage::new(), StaticPreference::light());
        assert_eq!(toggle.initialize(), Theme::Light);
    }

    #[test]
    fn unavailable_storage_falls_back_to_os_preference() {
        let (_, _, toggle) = page(
            MemoryStorage::unavailable().with_entry(THEME_KEY, "light"),
            StaticPreference::dark()
        );
        assert_eq!(toggle.initialize(), Theme::Dark);
    }

    #[test]
    fn garbage_stored_value_is_ignored() {
        let (_, _, toggle) = page(
            MemoryStorage::new().with_entry(THEME_KEY, "sepia"),
            StaticPreference::dark()
        );
        assert_eq!(toggle.initialize(), Theme::Dark);
    }

    #[test]
    fn toggle_persists_and_swaps_icons() {
        let (document, storage, toggle) = page(MemoryStorage::new(), StaticPreference::light());
        toggle.initialize();

        assert_eq!(toggle.toggle(), Theme::Dark);
        assert!(document.root_element().has_class(DARK_CLASS));
        assert_eq!(storage.peek(THEME_KEY).as_deref(), Some("dark"));
        assert!(hidden(&document, DARK_ICON_ID));
        assert!(!hidden(&document, LIGHT_ICON_ID));
    }

    #[test]
    fn toggle_follows_storage_over_root() {
        let (document, storage, toggle) = page(
            MemoryStorage::new().with_entry(THEME_KEY, "light"),
            StaticPreference::light()
        );
        // Root says dark, storage says light: storage decides.
        document.root_element().add_class(DARK_CLASS);
        assert_eq!(toggle.toggle(), Theme::Dark);
        assert_eq!(storage.peek(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn double_toggle_round_trips_and_notifies_twice() {
        for (stored, preference) in [
            (None, StaticPreference::light()),
            (None, StaticPreference::dark()),
            (Some("dark"), StaticPreference::light()),
            (Some("light"), StaticPreference::dark()),
        ] {
            let storage = match stored {
                Some(value) => MemoryStorage::new().with_entry(THEME_KEY, value),
                None => MemoryStorage::new(),
            };
            let (_, _, toggle) = page(storage, preference);
            let start = toggle.initialize();
            let (_, events) = toggle.channel();

            toggle.toggle();
            assert_eq!(toggle.toggle(), start);
            assert_eq!(toggle.current(), start);

            let received: Vec<ThemeSwitch> = events.try_iter().collect();
            assert_eq!(
                received,
                vec![ThemeSwitch { theme: start.toggled() }, ThemeSwitch { theme: start }]
            );
        }
    }

    #[test]
    fn toggle_without_storage_uses_root_and_still_notifies() {
        let (document, _, toggle) = page(MemoryStorage::unavailable(), StaticPreference::light());
        toggle.initialize();
        let (_, events) = toggle.channel();

        assert_eq!(toggle.toggle(), Theme::Dark);
        assert!(document.root_element().has_class(DARK_CLASS));
        assert_eq!(toggle.toggle(), Theme::Light);
        assert_eq!(events.try_iter().count(), 2);
    }

    #[test]
    fn unsubscribed_observers_stop_receiving() {
        let (_, _, toggle) = page(MemoryStorage::new(), StaticPreference::light());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = toggle.subscribe(move |event| sink.borrow_mut().push(event.theme));

        toggle.toggle();
        assert!(toggle.unsubscribe(id));
        assert!(!toggle.unsubscribe(id));
        toggle.toggle();

        assert_eq!(*seen.borrow(), vec![Theme::Dark]);
        assert_eq!(toggle.observer_count(), 0);
    }

    #[test]
    fn observers_run_in_subscription_order() {
        let (_, _, toggle) = page(MemoryStorage::new(), StaticPreference::light());
        let order = Rc::new(RefCell::new(Vec::new()));
        for name in ["highlighter", "chart"] {
            let order = Rc::clone(&order);
            toggle.subscribe(move |_| order.borrow_mut().push(name));
        }
        toggle.toggle();
        assert_eq!(*order.borrow(), vec!["highlighter", "chart"]);
    }

    #[test]
    fn missing_elements_fail_binding() {
        for id in [DARK_ICON_ID, LIGHT_ICON_ID, THEME_TOGGLE_ID] {
            let document = VirtualDocument::with_blog_chrome();
            document.remove_element(id);
            let result = ThemeToggle::bind(
                &document,
                Rc::new(MemoryStorage::new()),
                Rc::new(StaticPreference::light())
            );
            assert_eq!(result.err(), Some(BindError::MissingElement(id.to_string())));
        }
    }

    #[test]
    fn dropped_channels_are_released() {
        let (_, _, toggle) = page(MemoryStorage::new(), StaticPreference::light());
        for _ in 0..1000 {
            drop(toggle.channel());
        }
        let (_, live) = toggle.channel();
        assert_eq!(toggle.observer_count(), 1001);

        toggle.toggle();
        assert_eq!(toggle.observer_count(), 1);
        assert_eq!(live.try_iter().collect::<Vec<_>>(), vec![ThemeSwitch { theme: Theme::Dark }]);
    }

    #[test]
    fn channel_can_be_unsubscribed() {
        let (_, _, toggle) = page(MemoryStorage::new(), StaticPreference::light());
        let (id, events) = toggle.channel();
        assert!(toggle.unsubscribe(id));

        toggle.toggle();
        assert_eq!(events.try_iter().count(), 0);
        assert_eq!(toggle.observer_count(), 0);
    }

    #[test]
    fn unsubscribing_a_later_observer_mid_notification_skips_it() {
        let toggle = Rc::new(page(MemoryStorage::new(), StaticPreference::light()).2);
        let target: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let results = Rc::new(RefCell::new(Vec::new()));

        let handle = Rc::downgrade(&toggle);
        let victim = Rc::clone(&target);
        let outcomes = Rc::clone(&results);
        toggle.subscribe(move |_| {
            if let (Some(toggle), Some(id)) = (handle.upgrade(), victim.take()) {
                outcomes.borrow_mut().push(toggle.unsubscribe(id));
                outcomes.borrow_mut().push(toggle.unsubscribe(id));
            }
        });

        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        target.set(Some(toggle.subscribe(move |event| sink.borrow_mut().push(event.theme))));

        toggle.toggle();
        toggle.toggle();

        assert!(calls.borrow().is_empty());
        assert_eq!(*results.borrow(), vec![true, false]);
        assert_eq!(toggle.observer_count(), 1);
    }

    #[test]
    fn observer_can_unsubscribe_itself() {
        let toggle = Rc::new(page(MemoryStorage::new(), StaticPreference::light()).2);
        let own_id: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let calls = Rc::new(Cell::new(0));

        let handle = Rc::downgrade(&toggle);
        let id_slot = Rc::clone(&own_id);
        let counter = Rc::clone(&calls);
        let id = toggle.subscribe(move |_| {
            counter.set(counter.get() + 1);
            if let (Some(toggle), Some(id)) = (handle.upgrade(), id_slot.get()) {
                toggle.unsubscribe(id);
            }
        });
        own_id.set(Some(id));

        toggle.toggle();
        toggle.toggle();
        assert_eq!(calls.get(), 1);
        assert_eq!(toggle.observer_count(), 0);
        assert!(!toggle.unsubscribe(id));
    }

    #[test]
    fn subscribing_mid_notification_starts_with_the_next_toggle() {
        let toggle = Rc::new(page(MemoryStorage::new(), StaticPreference::light()).2);
        let late_events = Rc::new(RefCell::new(Vec::new()));
        let subscribed = Rc::new(Cell::new(false));

        let handle = Rc::downgrade(&toggle);
        let sink = Rc::clone(&late_events);
        let once = Rc::clone(&subscribed);
        toggle.subscribe(move |_| {
            if once.replace(true) {
                return;
            }
            if let Some(toggle) = handle.upgrade() {
                let sink = Rc::clone(&sink);
                toggle.subscribe(move |event| sink.borrow_mut().push(event.theme));
            }
        });

        toggle.toggle();
        assert!(late_events.borrow().is_empty());
        assert_eq!(toggle.observer_count(), 2);

        toggle.toggle();
        assert_eq!(*late_events.borrow(), vec![Theme::Light]);
    }

    #[test]
    fn nested_toggle_keeps_outer_bookkeeping() {
        let (document, storage, toggle) = page(MemoryStorage::new(), StaticPreference::light());
        let toggle = Rc::new(toggle);
        let target: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let first = Rc::new(RefCell::new(Vec::new()));

        let handle = Rc::downgrade(&toggle);
        let victim = Rc::clone(&target);
        let seen = Rc::clone(&first);
        toggle.subscribe(move |event| {
            seen.borrow_mut().push(event.theme);
            if let (Some(toggle), Some(id)) = (handle.upgrade(), victim.take()) {
                toggle.unsubscribe(id);
                toggle.toggle();
            }
        });

        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        target.set(Some(toggle.subscribe(move |event| sink.borrow_mut().push(event.theme))));

        assert_eq!(toggle.toggle(), Theme::Dark);

        // The nested toggle ran while every observer was busy, so nobody saw it.
        assert_eq!(*first.borrow(), vec![Theme::Dark]);
        assert!(calls.borrow().is_empty());
        assert_eq!(toggle.observer_count(), 1);
        assert_eq!(toggle.current(), Theme::Light);
        assert!(!document.root_element().has_class(DARK_CLASS));
        assert_eq!(storage.peek(THEME_KEY).as_deref(), Some("light"));

        toggle.toggle();
        assert_eq!(*first.borrow(), vec![Theme::Dark, Theme::Dark]);
        assert!(calls.borrow().is_empty());
    }
}
