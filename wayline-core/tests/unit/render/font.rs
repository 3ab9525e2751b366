use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = Path::new("target").join("font_scan").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn scan_ignores_non_font_files() {
    let dir = scratch("ignore");
    std::fs::write(dir.join("notes.txt"), b"x").unwrap();
    assert_eq!(find_font_in_dir(&dir), None);

    std::fs::write(dir.join("Zzz.ttf"), b"x").unwrap();
    assert_eq!(find_font_in_dir(&dir), Some(dir.join("Zzz.ttf")));
}

#[test]
fn scan_prefers_known_sans_faces() {
    let dir = scratch("prefer");
    std::fs::write(dir.join("Aaa.ttf"), b"x").unwrap();
    std::fs::write(dir.join("DejaVuSans-Bold.ttf"), b"x").unwrap();
    std::fs::write(dir.join("DejaVuSans.ttf"), b"x").unwrap();
    assert_eq!(find_font_in_dir(&dir), Some(dir.join("DejaVuSans.ttf")));
}

#[test]
fn missing_directory_resolves_to_none() {
    assert_eq!(find_font_in_dir(Path::new("target/font_scan/absent")), None);
}

#[test]
fn explicit_path_wins_over_scanning() {
    let dir = scratch("explicit");
    let p = dir.join("Custom.otf");
    std::fs::write(&p, b"fontbytes").unwrap();
    assert_eq!(load_font_bytes(Some(&p)).unwrap(), b"fontbytes");
    assert!(load_font_bytes(Some(&dir.join("missing.ttf"))).is_err());
}
