// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Integration tests for the CLI commands against template files on disk.

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use sigil::{Data, Engine, RenderError, SigilError};
use sigil_cli::commands::check::check_files;
use sigil_cli::commands::render::{self, load_data, render_file, Partial};
use sigil_cli::config::Config;

/// Create a small template project in a temp directory
fn setup_project(dir: &Path) {
    fs::write(dir.join("header.tpl"), "<header>@{title=Home}</header>").unwrap();
    fs::write(dir.join("card.tpl"), "<div>@{content}</div>").unwrap();
    fs::write(
        dir.join("page.tpl"),
        "@{header}\n<ul>@for{item in items}<li>@{item}</li>@endfor</ul>\n@if{footer}@{footer}@endif",
    )
    .unwrap();
    fs::write(
        dir.join("page.json"),
        r#"{ "items": ["a", "<b>"], "footer": "bye" }"#,
    )
    .unwrap();
    fs::write(dir.join("broken.tpl"), "@if{x}never closed").unwrap();
}

#[test]
fn test_render_with_data_and_partial() {
    let dir = tempdir().unwrap();
    setup_project(dir.path());

    let engine = Engine::new();
    let data = load_data(&dir.path().join("page.json")).unwrap();
    let partials = vec![Partial {
        name: "header".into(),
        path: dir.path().join("header.tpl"),
    }];

    let out = render_file(&engine, &dir.path().join("page.tpl"), data, &partials).unwrap();
    assert_eq!(
        out,
        "<header>Home</header>\n<ul><li>a</li><li>&lt;b&gt;</li></ul>\nbye"
    );
}

#[test]
fn test_partial_that_needs_data_fails() {
    let dir = tempdir().unwrap();
    setup_project(dir.path());

    let partials = vec![Partial {
        name: "header".into(),
        path: dir.path().join("card.tpl"),
    }];
    let err = render_file(
        &Engine::new(),
        &dir.path().join("page.tpl"),
        load_data(&dir.path().join("page.json")).unwrap(),
        &partials,
    )
    .unwrap_err();

    assert_eq!(
        err.downcast_ref::<RenderError>(),
        Some(&RenderError::NestedTemplateNeedsData("header".into()))
    );
}

#[test]
fn test_render_run_writes_output_file() {
    let dir = tempdir().unwrap();
    setup_project(dir.path());
    let output = dir.path().join("out.html");
    let header = format!("header={}", dir.path().join("header.tpl").display());

    render::run(
        &Engine::new(),
        &dir.path().join("page.tpl"),
        Some(dir.path().join("page.json").as_path()),
        &[header],
        Some(output.as_path()),
    )
    .unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("<header>Home</header>"));
    assert!(written.ends_with("bye"));
}

#[test]
fn test_data_must_be_an_object() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("list.json");
    fs::write(&path, "[1, 2]").unwrap();

    let err = load_data(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SigilError>(),
        Some(SigilError::InvalidData(_))
    ));
}

#[test]
fn test_check_reports_each_file() {
    let dir = tempdir().unwrap();
    setup_project(dir.path());

    let paths = vec![
        dir.path().join("page.tpl"),
        dir.path().join("broken.tpl"),
        dir.path().join("missing.tpl"),
    ];
    let reports = check_files(&Engine::new(), &paths);

    assert_eq!(reports.len(), 3);
    assert_eq!(*reports[0].result.as_ref().unwrap(), 3);
    assert!(!reports[1].is_ok());
    assert!(!reports[2].is_ok());
    assert!(sigil_cli::commands::check::run(&Engine::new(), &paths[..1]).is_ok());
    assert!(sigil_cli::commands::check::run(&Engine::new(), &paths).is_err());
}

#[test]
fn test_config_file_drives_engine() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("sigil.toml");
    fs::write(&config_path, "[engine]\nescape = \"raw\"\ncache_capacity = 4\n").unwrap();

    let engine = Config::load(Some(config_path.as_path())).unwrap().engine().unwrap();
    let out = engine
        .render("@{v}", &Data::new().with("v", "<raw>"))
        .unwrap();
    assert_eq!(out.as_str(), "<raw>");
    assert!(engine.cache_contains("@{v}"));
}

#[test]
fn test_bad_config_file_is_an_error() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("sigil.toml");
    fs::write(&config_path, "[engine]\nkey_validation = \"global\"\n").unwrap();

    assert!(Config::load(Some(config_path.as_path())).is_err());
}
