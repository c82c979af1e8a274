use crate::kernel::error::Error;
use crate::repository::{Conventions, Module, ModuleRepository, PendingIntent, SelfIdentity};
use crate::staging::StagingController;

fn repository() -> ModuleRepository {
    let mut repository = ModuleRepository::new("/host/user/plugin", Conventions::default(), SelfIdentity::default());
    repository.replace(vec![
        Module::new("_Off", None, true, true),
        Module::new("On", None, true, false),
        Module::new("Loose.dll", None, false, false),
        Module::new("Idle.dll.disabled", None, false, true),
    ]);
    repository
}

fn intents(repository: &ModuleRepository) -> Vec<PendingIntent> {
    repository.modules().iter().map(|m| m.pending_intent()).collect()
}

fn assert_exclusive(repository: &ModuleRepository) {
    for module in repository.modules() {
        assert!(!(module.is_delete_pending() && module.is_toggle_pending()));
    }
}

#[test]
fn test_bulk_enable_only_targets_disabled() {
    let mut repository = repository();
    repository.select_where(|_| true);

    let changed = StagingController::new(&mut repository).bulk_enable();
    assert_eq!(changed, 2);
    assert_eq!(
        intents(&repository),
        vec![PendingIntent::ToggleEnabled, PendingIntent::None, PendingIntent::None, PendingIntent::ToggleEnabled]
    );
    assert_exclusive(&repository);
}

#[test]
fn test_bulk_disable_mirrors_enable() {
    let mut repository = repository();
    repository.select_where(|_| true);
    StagingController::new(&mut repository).bulk_enable();

    StagingController::new(&mut repository).bulk_disable();
    assert_eq!(
        intents(&repository),
        vec![PendingIntent::None, PendingIntent::ToggleEnabled, PendingIntent::ToggleEnabled, PendingIntent::None],
        "disable clears toggles staged on disabled modules"
    );
    for module in repository.modules() {
        if module.is_toggle_pending() {
            assert!(!module.is_disabled());
        }
    }
}

#[test]
fn test_bulk_enable_keeps_pending_delete_on_enabled_module() {
    let mut repository = repository();
    repository.find_mut("On").unwrap().set_intent(PendingIntent::Delete);
    repository.select("On").unwrap();

    assert_eq!(StagingController::new(&mut repository).bulk_enable(), 0);
    assert_eq!(repository.find("On").unwrap().pending_intent(), PendingIntent::Delete);
}

#[test]
fn test_bulk_toggle_flips_staged_toggle() {
    let mut repository = repository();
    repository.select("_Off").unwrap();
    repository.select("On").unwrap();
    repository.find_mut("On").unwrap().set_intent(PendingIntent::Delete);

    let mut controller = StagingController::new(&mut repository);
    assert_eq!(controller.bulk_toggle(), 2);
    assert_eq!(repository.find("_Off").unwrap().pending_intent(), PendingIntent::ToggleEnabled);
    assert_eq!(repository.find("On").unwrap().pending_intent(), PendingIntent::None);

    StagingController::new(&mut repository).bulk_toggle();
    assert_eq!(repository.find("_Off").unwrap().pending_intent(), PendingIntent::None);
    assert_eq!(repository.find("On").unwrap().pending_intent(), PendingIntent::ToggleEnabled);
}

#[test]
fn test_bulk_delete_flips_and_clears_toggle() {
    let mut repository = repository();
    repository.select("Loose.dll").unwrap();
    repository.find_mut("Loose.dll").unwrap().set_intent(PendingIntent::ToggleEnabled);

    StagingController::new(&mut repository).bulk_delete();
    assert_eq!(repository.find("Loose.dll").unwrap().pending_intent(), PendingIntent::Delete);
    assert_exclusive(&repository);

    StagingController::new(&mut repository).bulk_delete();
    assert_eq!(repository.find("Loose.dll").unwrap().pending_intent(), PendingIntent::None);
}

#[test]
fn test_unselected_modules_untouched() {
    let mut repository = repository();
    let mut controller = StagingController::new(&mut repository);
    assert_eq!(controller.bulk_enable(), 0);
    assert_eq!(controller.bulk_delete(), 0);
    assert!(repository.staged().is_empty());
}

#[test]
fn test_stage_and_reset() {
    let mut repository = repository();
    let mut controller = StagingController::new(&mut repository);
    assert!(controller.stage("On", PendingIntent::Delete).unwrap());
    assert!(controller.stage("_Off", PendingIntent::ToggleEnabled).unwrap());
    assert!(matches!(controller.stage("Nope", PendingIntent::Delete), Err(Error::UnknownModule(_))));

    assert_eq!(controller.reset(), 2);
    assert!(repository.staged().is_empty());
}
