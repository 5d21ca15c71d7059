use imagify::{ImageEntry, Origin, Selection, SelectionAction};
use sha2::{Digest, Sha256};

fn entry(tag: u32) -> ImageEntry {
    ImageEntry::from_bytes("image/png", &tag.to_be_bytes(), Origin::File).unwrap()
}

fn filled(n: u32) -> Selection {
    let mut s = Selection::new();
    for tag in 0..n {
        s.apply(SelectionAction::Append(entry(tag)));
    }
    s
}

#[test]
fn remove_any_index_preserves_the_rest() {
    for len in 1..6u32 {
        for index in 0..len as usize {
            let mut s = filled(len);
            let before = s.snapshot();
            s.apply(SelectionAction::Remove(index));

            assert_eq!(s.len(), len as usize - 1);
            let mut expected = before.clone();
            expected.remove(index);
            assert_eq!(s.entries(), expected.as_slice());
        }
    }
}

#[test]
fn clear_always_empties() {
    for len in 0..4 {
        let mut s = filled(len);
        s.clear();
        assert_eq!(s.len(), 0);
    }
}

#[test]
fn non_image_types_never_enter() {
    let mut s = filled(2);
    for media_type in ["text/plain", "application/pdf", "video/mp4", "imagex/png", ""] {
        if let Some(e) = ImageEntry::from_bytes(media_type, b"x", Origin::Clipboard) {
            s.push(e);
        }
    }
    assert_eq!(s.len(), 2);
}

#[test]
fn output_name_is_stored_verbatim() {
    let mut s = Selection::new();
    s.set_output_name("  Report 2024 (final)  ");
    assert_eq!(s.output_name(), "  Report 2024 (final)  ");
}

#[test]
fn digest_matches_sha256_of_data_uri() {
    let e = entry(7);
    let full = hex::encode(Sha256::digest(e.data_uri().as_bytes()));
    assert!(full.starts_with(&e.digest()));
}
