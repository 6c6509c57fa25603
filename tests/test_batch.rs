mod common;

use cardprep::batch::{collect_photo_paths, output_path_for, processed_dir_for};
use common::*;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

fn jpg_names(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

#[test]
fn test_processed_dir_naming() {
    assert_eq!(processed_dir_for(Path::new("data/photos")), PathBuf::from("data/photos_processed"));
    assert_eq!(processed_dir_for(Path::new("data/photos/")), PathBuf::from("data/photos_processed"));
}

#[test]
fn test_output_path_naming() {
    let out = Path::new("out");
    assert_eq!(output_path_for(Path::new("in/ace.png"), out), PathBuf::from("out/ace.jpg"));
    assert_eq!(output_path_for(Path::new("in/king.of.hearts.jpeg"), out), PathBuf::from("out/king.jpg"));
    assert_eq!(output_path_for(Path::new("in/joker"), out), PathBuf::from("out/joker.jpg"));
}

#[test]
fn test_batch_writes_one_jpeg_per_photo() -> anyhow::Result<()> {
    let root = tempfile::TempDir::new()?;
    let photos = root.path().join("photos");
    std::fs::create_dir(&photos)?;
    write_card_photo(&photos, "ace.png");
    write_card_photo(&photos, "king.png");
    write_card_photo(&photos, "queen.bmp");

    let report = BatchRunner::new(CardIsolator::default()).run(&photos)?;

    let output_dir = root.path().join("photos_processed");
    assert_eq!(report.output_dir, output_dir);
    assert_eq!(report.written.len(), 3);
    assert!(report.skipped.is_empty());
    assert_eq!(jpg_names(&output_dir)?, vec!["ace.jpg", "king.jpg", "queen.jpg"]);

    let mut siblings = Vec::new();
    for entry in std::fs::read_dir(root.path())? {
        siblings.push(entry?.file_name().to_string_lossy().into_owned());
    }
    siblings.sort();
    assert_eq!(siblings, vec!["photos", "photos_processed"]);

    let card = image::open(output_dir.join("ace.jpg"))?;
    assert!(card.width() > 0 && card.width() < 100);

    Ok(())
}

#[test]
fn test_batch_ignores_subdirectories() -> anyhow::Result<()> {
    let root = tempfile::TempDir::new()?;
    let photos = root.path().join("photos");
    std::fs::create_dir_all(photos.join("nested"))?;
    write_card_photo(&photos, "ace.png");
    write_card_photo(&photos.join("nested"), "two.png");

    assert_eq!(collect_photo_paths(&photos)?, vec![photos.join("ace.png")]);

    let report = BatchRunner::new(CardIsolator::default()).run(&photos)?;
    assert_eq!(report.written.len(), 1);

    Ok(())
}

#[test]
fn test_batch_aborts_on_unreadable_photo() -> anyhow::Result<()> {
    let root = tempfile::TempDir::new()?;
    let photos = root.path().join("photos");
    std::fs::create_dir(&photos)?;
    write_card_photo(&photos, "ace.png");
    std::fs::write(photos.join("notes.txt"), "not an image")?;

    let err = BatchRunner::new(CardIsolator::default())
        .run(&photos)
        .expect_err("unreadable photo should abort");

    assert!(matches!(
        err.downcast_ref::<IsolateError>(),
        Some(IsolateError::Decode(_))
    ));

    Ok(())
}

#[test]
fn test_batch_skips_failures_when_asked() -> anyhow::Result<()> {
    let root = tempfile::TempDir::new()?;
    let photos = root.path().join("photos");
    std::fs::create_dir(&photos)?;
    write_card_photo(&photos, "ace.png");
    std::fs::write(photos.join("notes.txt"), "not an image")?;
    empty_photo(200, 200).save(photos.join("table.png"))?;

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();

    let report = BatchRunner::new(CardIsolator::default())
        .with_error_policy(ErrorPolicy::Skip)
        .with_observer(move |event: &BatchEvent<'_>| {
            let tag = match event {
                BatchEvent::Started { total, .. } => format!("start {}", total),
                BatchEvent::Processed { index, .. } => format!("ok {}", index),
                BatchEvent::Skipped { index, .. } => format!("skip {}", index),
                BatchEvent::Finished { report } => format!("done {}", report.written.len()),
            };
            sink.borrow_mut().push(tag);
        })
        .run(&photos)?;

    assert_eq!(report.written.len(), 1);
    assert_eq!(report.skipped.len(), 2);
    assert!(report.skipped.iter().any(|(p, _)| p.ends_with("notes.txt")));
    assert!(report.skipped.iter().any(|(p, msg)| p.ends_with("table.png") && msg.contains("no foreground")));

    assert_eq!(
        *events.borrow(),
        vec!["start 3", "ok 0", "skip 1", "skip 2", "done 1"]
    );

    Ok(())
}

#[test]
fn test_batch_counts_clamped_crops() -> anyhow::Result<()> {
    let root = tempfile::TempDir::new()?;
    let photos = root.path().join("photos");
    std::fs::create_dir(&photos)?;
    write_card_photo(&photos, "centre.png");
    write_edge_card_photo(&photos, "edge.png");

    let flagged = Rc::new(RefCell::new(Vec::new()));
    let sink = flagged.clone();

    let config = IsolatorConfig::default().with_resize(ResizeStrategy::Divisor(1));
    let report = BatchRunner::new(CardIsolator::new(config)?)
        .with_observer(move |event: &BatchEvent<'_>| {
            if let BatchEvent::Processed { source, clamped, .. } = event {
                let name = source.file_name().unwrap_or_default().to_string_lossy().into_owned();
                sink.borrow_mut().push((name, *clamped));
            }
        })
        .run(&photos)?;

    assert_eq!(report.written.len(), 2);
    assert_eq!(report.clamped, 1);
    assert_eq!(
        *flagged.borrow(),
        vec![("centre.png".to_string(), false), ("edge.png".to_string(), true)]
    );

    Ok(())
}
