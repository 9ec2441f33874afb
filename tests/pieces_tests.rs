//! Piece catalog tests

use gridfall::core::{CatalogError, Piece, PieceCatalog};
use gridfall::types::RotateDir;

#[test]
fn test_catalog_has_fifteen_odd_masks() {
    assert_eq!(PieceCatalog::len(), 15);
    for index in 0..PieceCatalog::len() {
        let mask = PieceCatalog::shape_of(index).unwrap();
        assert_eq!(mask.size() % 2, 1);
        assert!(mask.count() > 0, "piece {index} has no cells");
    }
}

#[test]
fn test_four_rotations_are_identity() {
    for index in 0..PieceCatalog::len() {
        let mask = PieceCatalog::shape_of(index).unwrap();
        let mut turned = mask;
        for _ in 0..4 {
            turned = PieceCatalog::rotate(turned);
        }
        assert_eq!(turned, mask, "piece {index}");
    }
}

#[test]
fn test_rotation_keeps_cell_count() {
    for index in 0..PieceCatalog::len() {
        let piece = Piece::new(index).unwrap();
        let cw = piece.rotated(RotateDir::Clockwise);
        assert_eq!(cw.mask().count(), piece.mask().count());
        assert_eq!(cw.rotated(RotateDir::CounterClockwise), piece);
    }
}

#[test]
fn test_out_of_range_index() {
    assert_eq!(
        Piece::new(15),
        Err(CatalogError::OutOfRange {
            index: 15,
            count: 15
        })
    );
    assert!(PieceCatalog::name_of(200).is_err());
}

#[test]
fn test_piece_serializes_with_name_and_mask() {
    let json = serde_json::to_value(Piece::new(3).unwrap()).unwrap();
    assert_eq!(json["index"], 3);
    assert_eq!(json["value"], 4);
    assert_eq!(json["name"], "dot");
    assert_eq!(json["mask"][1][1], 1);
}
