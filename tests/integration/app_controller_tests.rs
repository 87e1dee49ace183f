/*!
 * Integration tests for batch runs through the controller
 */

use anyhow::Result;
use std::fs;

use xmlpack::app_config::Config;
use xmlpack::app_controller::Controller;
use xmlpack::file_utils::FileManager;
use xmlpack::translation::mock::MockTranslator;

use crate::common::{self, SAMPLE_REPACKED, SAMPLE_TRANSLATED, SAMPLE_UNPACKED};

#[test]
fn test_withConfig_invalidConfig_shouldFail() {
    let mut config = Config::default();
    config.packing.character_limit = 0;
    assert!(Controller::with_config(config).is_err());
}

/// One broken file does not stop the rest of the batch
#[test]
fn test_runUnpack_withOneBrokenFile_shouldUnpackTheRest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    let input_dir = root.join("scripts");
    common::create_sample_script(&input_dir, "dialog.xml")?;
    common::create_cp1251_file(&input_dir, "nested/menu.xml", "<text>Меню</text>\n")?;
    common::create_cp1251_file(&input_dir, "broken.xml", "<text>Начало\n")?;
    common::create_test_file(&input_dir, "notes.txt", "<text>ignored</text>\n")?;
    let output_dir = root.join("output-unpack");

    let controller = Controller::with_config(Config::default())?;
    let summary = controller.run_unpack(&[input_dir], &output_dir, None)?;

    assert!(!summary.is_success());
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(FileManager::display_name(&summary.failed[0].0), "broken.xml");

    let mut names: Vec<String> = summary.written.iter().map(FileManager::display_name).collect();
    names.sort();
    assert_eq!(names, vec!["dialog_unpacked.txt", "menu_unpacked.txt"]);
    assert_eq!(common::read_cp1251(&output_dir.join("menu_unpacked.txt"))?, "[1] Меню\n");

    assert!(summary.into_result().is_err());
    Ok(())
}

/// Partitioning is switched on through the config
#[test]
fn test_runUnpack_withPartitioningConfig_shouldNumberFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    let script = common::create_sample_script(root, "dialog.xml")?;
    let placeholder_dir = root.join("input-repack");

    let mut config = Config::default();
    config.packing.partition = true;
    config.packing.character_limit = 10_000;

    let controller = Controller::with_config(config)?;
    let written = controller
        .run_unpack(&[script], &root.join("out"), Some(placeholder_dir.as_path()))?
        .into_result()?;

    assert_eq!(written, vec![root.join("out").join("dialog_unpacked-0.txt")]);
    assert_eq!(common::read_cp1251(&written[0])?, SAMPLE_UNPACKED);
    assert!(FileManager::file_exists(placeholder_dir.join("dialog_translate-0.txt")));
    Ok(())
}

#[test]
fn test_runRepack_shouldUseConfiguredEncodings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    let script = common::create_sample_script(root, "dialog.xml")?;
    let translated = common::create_test_file(root, "dialog_translate.txt", SAMPLE_TRANSLATED)?;

    let controller = Controller::with_config(Config::default())?;
    let output = controller.run_repack(&script, &[translated], &root.join("output-repack"))?;

    assert_eq!(common::read_cp1251(&output)?, SAMPLE_REPACKED);
    Ok(())
}

#[test]
fn test_runAlign_withDirectories_shouldAlignEveryPair() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    let base_dir = root.join("edited");
    let anchor_dir = root.join("output-unpack");
    common::create_test_file(&base_dir, "dialog_translate.txt", "[4 Hi\n")?;
    common::create_test_file(&base_dir, "menu_translate.txt", "[ Menu\n")?;
    common::create_test_file(&anchor_dir, "dialog_unpacked.txt", "[4] Hi\n")?;
    common::create_test_file(&anchor_dir, "menu_unpacked.txt", "[1] Menu\n")?;
    let output_dir = root.join("output_align");

    let controller = Controller::with_config(Config::default())?;
    let written = controller
        .run_align(&[base_dir], &[anchor_dir], &output_dir)?
        .into_result()?;

    assert_eq!(written.len(), 2);
    assert_eq!(fs::read_to_string(output_dir.join("dialog_aligned.txt"))?, "[4] Hi\n");
    assert_eq!(fs::read_to_string(output_dir.join("menu_aligned.txt"))?, "[1] Menu\n");
    Ok(())
}

#[test]
fn test_runAlign_withUnequalFileSets_shouldFailBeforeWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    let base = common::create_test_file(root, "a/dialog_translate.txt", "[1] A\n")?;
    let output_dir = root.join("output_align");

    let controller = Controller::with_config(Config::default())?;
    assert!(controller.run_align(&[base], &[], &output_dir).is_err());
    assert!(!output_dir.exists());
    Ok(())
}

/// Direct translation uses the configured target language
#[test]
fn test_runTranslate_shouldTranslateSimpleSpansIntoTargetLanguage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    let script = common::create_cp1251_file(root, "menu.xml", "<m>\n  <text>Меню</text>\n<text>Начало\nконец</text>\n</m>\n")?;
    let translator = MockTranslator::new().with_entry("Меню", "Menu");

    let mut config = Config::default();
    config.target_language = "DE".to_string();
    let controller = Controller::with_config(config)?;
    let output = controller.run_translate(&script, &translator, &root.join("translated"))?;

    assert_eq!(output, root.join("translated").join("menu.xml"));
    assert_eq!(
        common::read_cp1251(&output)?,
        "<m>\n  <text>Menu</text>\n<text>Начало\nконец</text>\n</m>\n"
    );
    assert_eq!(translator.call_count(), 1);
    assert_eq!(translator.last_target_language().as_deref(), Some("DE"));
    Ok(())
}

#[test]
fn test_runTranslate_withFailingProvider_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    let script = common::create_cp1251_file(root, "menu.xml", "<text>Меню</text>\n")?;
    let output_dir = root.join("translated");

    let controller = Controller::with_config(Config::default())?;
    assert!(controller.run_translate(&script, &MockTranslator::failing(), &output_dir).is_err());
    assert!(!output_dir.join("menu.xml").exists());
    Ok(())
}
