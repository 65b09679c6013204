use std::cell::RefCell;
use std::rc::Rc;

use super::*;

#[derive(Clone, Default)]
struct MemoryStorage {
    value: Rc<RefCell<Option<String>>>,
    broken: bool,
}

impl MemoryStorage {
    fn with(value: &str) -> Self {
        Self {
            value: Rc::new(RefCell::new(Some(value.to_owned()))),
            broken: false,
        }
    }

    fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    fn get(&self) -> Option<String> {
        self.value.borrow().clone()
    }
}

impl ThemeStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, PageError> {
        if self.broken {
            return Err(PageError::StorageUnavailable);
        }
        Ok(self.get())
    }

    fn store(&self, value: &str) -> Result<(), PageError> {
        if self.broken {
            return Err(PageError::Storage("quota".to_owned()));
        }
        *self.value.borrow_mut() = Some(value.to_owned());
        Ok(())
    }
}

/// Root marker: `None` means the attribute is absent.
#[derive(Clone, Default)]
struct RecordingRoot {
    marker: Rc<RefCell<Option<&'static str>>>,
}

impl RecordingRoot {
    fn marker(&self) -> Option<&'static str> {
        *self.marker.borrow()
    }
}

impl ThemeRoot for RecordingRoot {
    fn apply(&self, theme: Theme) {
        *self.marker.borrow_mut() = theme.is_dark().then_some("dark");
    }
}

#[derive(Clone, Default)]
struct RecordingControl {
    rendered: Rc<RefCell<Vec<ControlState>>>,
}

impl RecordingControl {
    fn last(&self) -> Option<ControlState> {
        self.rendered.borrow().last().copied()
    }
}

impl ToggleControl for RecordingControl {
    fn render(&self, state: &ControlState) {
        self.rendered.borrow_mut().push(*state);
    }
}

fn controls(n: usize) -> Vec<RecordingControl> {
    (0..n).map(|_| RecordingControl::default()).collect()
}

// =============================================================
// Theme values
// =============================================================

#[test]
fn from_stored_only_accepts_literal_dark() {
    assert_eq!(Theme::from_stored(Some("dark")), Theme::Dark);
    assert_eq!(Theme::from_stored(Some("light")), Theme::Light);
    assert_eq!(Theme::from_stored(Some("DARK")), Theme::Light);
    assert_eq!(Theme::from_stored(None), Theme::Light);
}

#[test]
fn inverted_flips_both_ways() {
    assert_eq!(Theme::Light.inverted(), Theme::Dark);
    assert_eq!(Theme::Dark.inverted(), Theme::Light);
    assert_eq!(Theme::default(), Theme::Light);
}

#[test]
fn control_state_names_the_next_mode() {
    let dark = ControlState::for_theme(Theme::Dark);
    assert_eq!(dark.icon, "🌜");
    assert_eq!(dark.label, "Dark");
    assert!(dark.active);
    assert_eq!(dark.mode, "dark");
    assert_eq!(dark.action_label, "Switch to light mode");

    let light = ControlState::for_theme(Theme::Light);
    assert_eq!(light.icon, "🌞");
    assert_eq!(light.label, "Light");
    assert!(!light.active);
    assert_eq!(light.mode, "light");
    assert_eq!(light.action_label, "Switch to dark mode");
}

// =============================================================
// Initialization
// =============================================================

#[test]
fn init_without_preference_is_light_and_unmarked() {
    let root = RecordingRoot::default();
    let toggle = ThemeToggle::init(MemoryStorage::default(), root.clone(), controls(1));
    assert_eq!(toggle.theme(), Theme::Light);
    assert_eq!(root.marker(), None);
    assert_eq!(toggle.controls()[0].last(), Some(ControlState::for_theme(Theme::Light)));
}

#[test]
fn init_with_dark_marks_root_before_syncing_controls() {
    let root = RecordingRoot::default();
    let toggle = ThemeToggle::init(MemoryStorage::with("dark"), root.clone(), controls(2));
    assert_eq!(toggle.theme(), Theme::Dark);
    assert_eq!(root.marker(), Some("dark"));
    for control in toggle.controls() {
        assert_eq!(control.rendered.borrow().len(), 1);
        assert_eq!(control.last(), Some(ControlState::for_theme(Theme::Dark)));
    }
}

#[test]
fn init_with_zero_controls_is_fine() {
    let toggle = ThemeToggle::init(
        MemoryStorage::with("dark"),
        RecordingRoot::default(),
        Vec::<RecordingControl>::new(),
    );
    assert_eq!(toggle.toggle(), Theme::Light);
}

// =============================================================
// Toggling
// =============================================================

#[test]
fn toggle_keeps_root_and_storage_in_agreement() {
    let storage = MemoryStorage::default();
    let root = RecordingRoot::default();
    let toggle = ThemeToggle::init(storage.clone(), root.clone(), controls(1));

    let mut previous = toggle.theme();
    for _ in 0..5 {
        let next = toggle.toggle();
        assert_eq!(next, previous.inverted());
        assert_eq!(storage.get().as_deref(), Some(next.as_str()));
        assert_eq!(root.marker().is_some(), next.is_dark());
        previous = next;
    }
}

#[test]
fn toggle_rerenders_every_control_identically() {
    let toggle = ThemeToggle::init(MemoryStorage::default(), RecordingRoot::default(), controls(3));
    toggle.toggle();
    let expected = Some(ControlState::for_theme(Theme::Dark));
    for control in toggle.controls() {
        assert_eq!(control.last(), expected);
        assert_eq!(control.rendered.borrow().len(), 2);
    }
}

#[test]
fn broken_storage_degrades_to_session_only() {
    let root = RecordingRoot::default();
    let toggle = ThemeToggle::init(MemoryStorage::broken(), root.clone(), controls(2));
    assert_eq!(toggle.theme(), Theme::Light);
    assert_eq!(root.marker(), None);

    assert_eq!(toggle.toggle(), Theme::Dark);
    assert_eq!(root.marker(), Some("dark"));
    for control in toggle.controls() {
        assert_eq!(control.last(), Some(ControlState::for_theme(Theme::Dark)));
    }
}

#[test]
fn read_preference_treats_unknown_value_as_light() {
    assert_eq!(read_preference(&MemoryStorage::with("sepia")), Theme::Light);
    assert_eq!(read_preference(&MemoryStorage::broken()), Theme::Light);
}
