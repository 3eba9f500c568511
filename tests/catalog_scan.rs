use flashcards::catalog::Catalog;
use flashcards::error::ResourceError;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"x").unwrap();
}

#[test]
fn three_pairs_load_in_discovery_order() {
    let tmp = tempdir().unwrap();
    for stem in ["kelev", "bayit", "sefer"] {
        touch(tmp.path(), &format!("{stem}.png"));
        touch(tmp.path(), &format!("{stem}.mp3"));
    }
    touch(tmp.path(), "notes.txt");

    let report = Catalog::load(&[tmp.path().to_path_buf()]).unwrap();
    let catalog = report.catalog;
    assert_eq!(catalog.len(), 3);
    let labels: Vec<&str> = catalog.labels().collect();
    assert_eq!(labels, vec!["bayit", "kelev", "sefer"]);
    for entry in catalog.entries() {
        assert_eq!(entry.image.file_stem(), entry.audio.file_stem());
    }
    assert!(report.problems.is_empty());
    assert!(report.unpaired.is_empty());
}

#[test]
fn directories_are_appended_in_given_order() {
    let tmp = tempdir().unwrap();
    let first = tmp.path().join("milim2");
    let second = tmp.path().join("milim1");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();
    touch(&first, "zayin.jpeg");
    touch(&first, "zayin.mp3");
    touch(&second, "alef.GIF");
    touch(&second, "alef.MP3");

    let report = Catalog::load(&[first.clone(), second.clone()]).unwrap();
    let labels: Vec<&str> = report.catalog.labels().collect();
    assert_eq!(labels, vec!["zayin", "alef"]);
    let images: Vec<_> = report.catalog.images().map(Path::to_path_buf).collect();
    assert_eq!(images, vec![first.join("zayin.jpeg"), second.join("alef.GIF")]);
}

#[test]
fn missing_directory_is_reported_and_scan_continues() {
    let tmp = tempdir().unwrap();
    let good = tmp.path().join("good");
    fs::create_dir_all(&good).unwrap();
    touch(&good, "mayim.png");
    touch(&good, "mayim.mp3");
    let missing = tmp.path().join("missing");

    let report = Catalog::load(&[missing.clone(), good]).unwrap();
    assert_eq!(report.catalog.len(), 1);
    assert_eq!(report.problems.len(), 1);
    assert!(matches!(
        &report.problems[0],
        ResourceError::MissingDirectory(p) if *p == missing
    ));
}

#[test]
fn file_instead_of_directory_is_reported() {
    let tmp = tempdir().unwrap();
    touch(tmp.path(), "plain.txt");
    let err = Catalog::load(&[tmp.path().join("plain.txt")]).unwrap_err();
    match err {
        ResourceError::EmptyCatalog { problems } => {
            assert!(matches!(problems[..], [ResourceError::NotADirectory(_)]));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn images_without_audio_make_an_empty_catalog() {
    let tmp = tempdir().unwrap();
    touch(tmp.path(), "a.png");
    touch(tmp.path(), "b.png");
    touch(tmp.path(), "c.mp3");

    let err = Catalog::load(&[tmp.path().to_path_buf()]).unwrap_err();
    assert!(matches!(err, ResourceError::EmptyCatalog { .. }));
}

#[test]
fn partially_paired_directory_keeps_complete_pairs() {
    let tmp = tempdir().unwrap();
    touch(tmp.path(), "a.png");
    touch(tmp.path(), "a.mp3");
    touch(tmp.path(), "b.png");
    touch(tmp.path(), "c.mp3");

    let report = Catalog::load(&[tmp.path().to_path_buf()]).unwrap();
    assert_eq!(report.catalog.len(), 1);
    let mut unpaired = report.unpaired.clone();
    unpaired.sort();
    assert_eq!(
        unpaired,
        vec![tmp.path().join("b.png"), tmp.path().join("c.mp3")]
    );
}

#[cfg(unix)]
#[test]
fn symlinked_cards_are_loaded() {
    let tmp = tempdir().unwrap();
    let store = tmp.path().join("store");
    let deck = tmp.path().join("deck");
    fs::create_dir_all(&store).unwrap();
    fs::create_dir_all(&deck).unwrap();
    touch(&store, "shalom.png");
    touch(&store, "shalom.mp3");
    std::os::unix::fs::symlink(store.join("shalom.png"), deck.join("shalom.png")).unwrap();
    std::os::unix::fs::symlink(store.join("shalom.mp3"), deck.join("shalom.mp3")).unwrap();

    let report = Catalog::load(&[deck.clone()]).unwrap();
    assert_eq!(report.catalog.len(), 1);
    let entry = &report.catalog.entries()[0];
    assert_eq!(entry.label, "shalom");
    assert_eq!(entry.image, deck.join("shalom.png"));
    assert_eq!(entry.audio, deck.join("shalom.mp3"));
    assert!(report.unpaired.is_empty());
}

#[cfg(unix)]
#[test]
fn unreadable_directory_is_reported_and_scan_continues() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    let locked = tmp.path().join("locked");
    let good = tmp.path().join("good");
    fs::create_dir_all(&locked).unwrap();
    fs::create_dir_all(&good).unwrap();
    touch(&locked, "sod.png");
    touch(&locked, "sod.mp3");
    touch(&good, "or.png");
    touch(&good, "or.mp3");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores directory permissions; nothing to check then.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let report = Catalog::load(&[locked.clone(), good]);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let report = report.unwrap();

    let labels: Vec<&str> = report.catalog.labels().collect();
    assert_eq!(labels, vec!["or"]);
    assert_eq!(report.problems.len(), 1);
    assert!(matches!(
        &report.problems[0],
        ResourceError::PermissionDenied(p) if *p == locked
    ));
}
