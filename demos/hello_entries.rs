use entry_kit::{CopyOptions, FileEntry, FileOptions, FolderEntry, FolderOptions, LoadOptions};

fn main() {
    let tmp = std::env::temp_dir();
    println!("Temp dir: {}", tmp.display());

    let root = tmp.join("hello_entries");

    // nothing is touched on the host yet: the folder doesn't exist,
    // but building the entry never fails
    let mut folder = FolderEntry::new(&root, FolderOptions::new());

    // creates `/tmp/hello_entries` on host
    folder.load_sync(LoadOptions::new()).unwrap();

    // files built from content are written on their first load;
    // missing parent folders (`docs`) are created along the way
    let mut first = FileEntry::new(root.join("docs/first.txt"), FileOptions::new().content("Hello")).unwrap();
    first.load_sync(LoadOptions::new()).unwrap();

    let mut second = FileEntry::new(root.join("second.txt"), FileOptions::new().content("World")).unwrap();
    second.load_sync(LoadOptions::new()).unwrap();

    // a mocked file gets a random name next to the requested one,
    // so repeated runs never collide
    let mut scratch = FileEntry::new(root.join("scratch.log"), FileOptions::new().content("").mocked(true)).unwrap();
    scratch.load_sync(LoadOptions::new()).unwrap();
    println!("Mocked file: {}", scratch.path().display());

    // `files()` / `folders()` are filled by a recursive load only
    folder.load_sync(LoadOptions::new().with_sub(true).with_content(true)).unwrap();
    println!("Tree size: {} bytes", folder.size().unwrap_or_default());

    // globs are relative to the folder and `**` crosses directories;
    // the query reloads the tree from disk first
    let texts = folder.get_files_by_pattern_sync(Some("**/*.txt")).unwrap();
    let names: Vec<&str> = texts.iter().map(|file| file.base()).collect();
    assert_eq!(names, vec!["second.txt", "first.txt"]);

    // blocking loads keep the supplied content in memory
    let hello = first.get_content_sync(false).unwrap();
    let world = second.get_content_sync(false).unwrap();
    println!("{}, {}!", String::from_utf8_lossy(&hello), String::from_utf8_lossy(&world));

    // copies the whole tree; every copied entry is flagged `is_copy`
    let mut backup = folder.copy_to_sync(tmp.join("hello_entries_backup"), CopyOptions::new()).unwrap();
    assert!(backup.files().iter().all(FileEntry::is_copy));

    // removes both trees from the host
    backup.remove_sync().unwrap();
    folder.remove_sync().unwrap();
    assert!(!FolderEntry::exists_sync(&root));
}
