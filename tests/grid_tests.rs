//! Grid tests - placement, overlap and line clearing

use gridfall::core::{Grid, Piece, PieceCatalog};
use gridfall::types::{Coord, OUT_OF_BOUNDS};

const DOT: u8 = 3;
const PLUS: u8 = 2;
const LINE: u8 = 0;

fn piece(index: u8) -> Piece {
    Piece::new(index).unwrap()
}

#[test]
fn test_grid_new_empty() {
    let grid = Grid::new(5, 5);
    assert_eq!(grid.cols(), 5);
    assert_eq!(grid.rows(), 5);
    for y in 0..5 {
        for x in 0..5 {
            assert_eq!(grid.get(x, y), 0, "cell ({x}, {y}) should be empty");
        }
    }
    assert_eq!(grid.get(5, 0), OUT_OF_BOUNDS);
}

#[test]
fn test_placement_writes_exactly_mask_cells() {
    for index in 0..PieceCatalog::len() {
        let mut grid = Grid::new(5, 5);
        let p = piece(index);
        assert!(grid.can_place(&p, 2, 2), "{p} should fit in the middle");
        grid.place(&p, 2, 2);

        let mask = p.mask();
        let offset = mask.center();
        let mut expected = 0;
        for by in 0..mask.size() as i32 {
            for bx in 0..mask.size() as i32 {
                let value = grid.get(2 - offset + bx, 2 - offset + by);
                if mask.get(bx, by) {
                    assert_eq!(value, p.value());
                    expected += 1;
                } else {
                    assert_eq!(value, 0);
                }
            }
        }
        assert_eq!(grid.filled_count(), expected);
    }
}

#[test]
fn test_overlap_leaves_grid_unchanged() {
    let mut grid = Grid::new(5, 5);
    grid.place(&piece(DOT), 2, 1);
    let before = grid.checksum();

    assert!(!grid.can_place(&piece(PLUS), 2, 2));
    assert_eq!(grid.checksum(), before);
}

#[test]
fn test_out_of_bounds_is_not_placeable() {
    let grid = Grid::new(5, 5);
    assert!(!grid.can_place(&piece(PLUS), 0, 2));
    assert!(!grid.can_place(&piece(LINE), 4, 4));
    assert!(grid.can_place(&piece(DOT), 4, 4));
    assert!(!grid.can_place(&piece(DOT), 5, 4));
}

#[test]
fn test_full_row_and_column_clear_together() {
    let mut grid = Grid::new(5, 5);
    for i in 0..5 {
        grid.set(i, 2, 1);
        grid.set(2, i, 1);
    }

    let clear = grid.clear_lines();
    assert_eq!(clear.lines, 2);
    // The shared cell (2, 2) counts once.
    assert_eq!(clear.cell_count(), 9);
    assert!(clear.cells.contains(&Coord::new(2, 2)));
    assert_eq!(grid.filled_count(), 0);
}

#[test]
fn test_partial_lines_stay() {
    let mut grid = Grid::new(5, 5);
    for x in 0..4 {
        grid.set(x, 0, 1);
    }
    let before = grid.checksum();
    let clear = grid.clear_lines();
    assert!(clear.is_empty());
    assert_eq!(clear.lines, 0);
    assert_eq!(grid.checksum(), before);
}

#[test]
fn test_cleared_cells_read_zero() {
    let mut grid = Grid::new(3, 3);
    for x in 0..3 {
        grid.set(x, 0, 5);
    }
    grid.set(1, 2, 4);

    let clear = grid.clear_lines();
    for cell in &clear.cells {
        assert_eq!(grid.get(cell.x, cell.y), 0);
    }
    assert_eq!(grid.get(1, 2), 4);
}
