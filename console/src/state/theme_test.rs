use std::sync::atomic::{AtomicBool, Ordering};

use super::*;
use crate::storage::MemoryStore;

fn store_with(system_dark: Arc<AtomicBool>) -> (ThemeStore, SharedStore) {
    let storage: SharedStore = Arc::new(MemoryStore::new());
    let probe = move || if system_dark.load(Ordering::SeqCst) { Theme::Dark } else { Theme::Light };
    (ThemeStore::restore(storage.clone(), Arc::new(probe)), storage)
}

#[test]
fn fresh_store_follows_system() {
    let (store, _) = store_with(Arc::new(AtomicBool::new(true)));
    assert_eq!(store.state(), ThemeState { theme: Theme::Dark, is_system_theme: true });
}

#[test]
fn toggle_flips_and_pins_choice() {
    let (store, storage) = store_with(Arc::new(AtomicBool::new(false)));
    assert_eq!(store.toggle(), Theme::Dark);
    assert!(!store.state().is_system_theme);
    assert_eq!(store.toggle(), Theme::Light);

    let saved: ThemeState = load_json(storage.as_ref(), THEME_STORAGE_KEY).unwrap().unwrap();
    assert_eq!(saved, ThemeState { theme: Theme::Light, is_system_theme: false });
}

#[test]
fn init_rereads_system_only_when_following() {
    let system_dark = Arc::new(AtomicBool::new(false));
    let (store, _) = store_with(system_dark.clone());
    system_dark.store(true, Ordering::SeqCst);
    assert_eq!(store.init(), Theme::Dark);

    store.set(Theme::Light);
    assert_eq!(store.init(), Theme::Light);
}

#[test]
fn system_change_ignored_when_pinned() {
    let (store, _) = store_with(Arc::new(AtomicBool::new(false)));
    store.system_changed(Theme::Dark);
    assert_eq!(store.theme(), Theme::Dark);

    store.set(Theme::Light);
    store.system_changed(Theme::Dark);
    assert_eq!(store.theme(), Theme::Light);

    assert_eq!(store.use_system_theme(), Theme::Light);
    assert!(store.state().is_system_theme);
}

#[test]
fn preference_survives_restore() {
    let storage: SharedStore = Arc::new(MemoryStore::new());
    let probe: Arc<dyn SystemThemeProbe> = Arc::new(|| Theme::Light);
    ThemeStore::restore(storage.clone(), probe.clone()).set(Theme::Dark);
    let restored = ThemeStore::restore(storage, probe);
    assert_eq!(restored.state(), ThemeState { theme: Theme::Dark, is_system_theme: false });
}

#[test]
fn corrupt_preference_falls_back_to_system() {
    let storage: SharedStore = Arc::new(MemoryStore::new());
    storage.set(THEME_STORAGE_KEY, "{not json").unwrap();
    let store = ThemeStore::restore(storage, Arc::new(|| Theme::Dark));
    assert_eq!(store.state(), ThemeState { theme: Theme::Dark, is_system_theme: true });
}

#[test]
fn subscribers_see_changes() {
    let (store, _) = store_with(Arc::new(AtomicBool::new(false)));
    let mut rx = store.subscribe();
    store.toggle();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().theme, Theme::Dark);
}

#[test]
fn colorfgbg_background_decides() {
    assert_eq!(theme_from_colorfgbg("15;0"), Theme::Dark);
    assert_eq!(theme_from_colorfgbg("0;15"), Theme::Light);
    assert_eq!(theme_from_colorfgbg("15;default;0"), Theme::Dark);
    assert_eq!(theme_from_colorfgbg("garbage"), Theme::Light);
}
