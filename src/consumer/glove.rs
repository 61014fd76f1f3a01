use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::info;

use crate::consumer::worker::FrameHandler;
use crate::pipeline::types::TileGrid;

/// The motor array on the glove — one vibration actuator per tile.
///
/// Implemented over I2C on the real hardware; the console implementation
/// below stands in during development.
pub trait MotorBoard: Send + 'static {
    /// Set one actuator's drive level. 0 is silent, 255 full strength.
    fn set_level(&mut self, motor: usize, level: u8);

    /// Number of actuators on the board.
    fn motor_count(&self) -> usize;
}

/// Perceived-strength correction for the LRA actuators.
///
/// The actuators' felt intensity is far from linear in the drive value, so
/// raw levels are pushed through this measured curve before they reach the
/// board. Index 0 stays 0 (off); the top step saturates at full drive.
const RESPONSE_CURVE: [u8; 256] = [
    0, 20, 20, 20, 21, 21, 21, 21, 21, 21, 21, 22, 22, 22, 22, 22,
    22, 23, 23, 23, 23, 24, 24, 24, 24, 25, 25, 25, 25, 26, 26, 26,
    27, 27, 28, 28, 28, 29, 29, 30, 30, 31, 31, 32, 32, 33, 33, 34,
    34, 35, 36, 36, 37, 37, 38, 39, 39, 40, 40, 41, 42, 42, 43, 44,
    44, 45, 45, 46, 47, 47, 48, 49, 49, 50, 51, 51, 52, 53, 54, 54,
    55, 56, 56, 57, 58, 59, 59, 60, 61, 61, 62, 63, 64, 64, 65, 66,
    67, 67, 68, 69, 70, 70, 71, 72, 73, 74, 74, 75, 76, 77, 78, 78,
    79, 80, 81, 82, 82, 83, 84, 85, 86, 87, 87, 88, 89, 90, 91, 92,
    93, 93, 94, 95, 96, 97, 98, 99, 100, 101, 101, 102, 103, 104, 105, 106,
    107, 108, 109, 110, 111, 112, 113, 114, 115, 116, 117, 118, 119, 120, 121, 122,
    123, 124, 125, 126, 127, 128, 129, 130, 131, 132, 133, 134, 135, 136, 138, 139,
    140, 141, 142, 143, 144, 145, 146, 148, 149, 150, 151, 152, 153, 154, 155, 157,
    158, 159, 160, 161, 162, 164, 165, 166, 167, 168, 169, 171, 172, 173, 174, 175,
    177, 178, 179, 180, 181, 183, 184, 185, 186, 187, 189, 190, 191, 192, 194, 195,
    196, 197, 198, 200, 201, 202, 203, 205, 206, 207, 208, 210, 211, 212, 213, 215,
    216, 217, 218, 220, 221, 222, 224, 225, 227, 229, 232, 235, 239, 245, 254, 255,
];

/// Grid cell to physical motor mapping for the 3x3 glove wiring harness.
const MOTOR_ORDER_3X3: [usize; 9] = [2, 5, 6, 1, 3, 7, 0, 4, 8];

/// Drives the motor board from incoming tile grids.
///
/// Applies the response curve to every cell, remaps the 3x3 layout onto
/// the physical wiring order, and mutes the whole board when its consumer
/// winds down so motors never keep buzzing past the last frame.
pub struct GloveDriver<B: MotorBoard> {
    board: B,
}

impl<B: MotorBoard> GloveDriver<B> {
    pub fn new(board: B) -> Self {
        Self { board }
    }

    fn motor_for_cell(&self, cell: usize, cell_count: usize) -> usize {
        if cell_count == MOTOR_ORDER_3X3.len() {
            MOTOR_ORDER_3X3[cell]
        } else {
            cell
        }
    }

    fn mute_all(&mut self) {
        for motor in 0..self.board.motor_count() {
            self.board.set_level(motor, 0);
        }
    }
}

impl<B: MotorBoard> FrameHandler<TileGrid> for GloveDriver<B> {
    fn on_frame(&mut self, grid: Arc<TileGrid>) -> ControlFlow<()> {
        let cells = grid.cells();
        let available = self.board.motor_count();
        for (cell, &value) in cells.iter().enumerate() {
            let motor = self.motor_for_cell(cell, cells.len());
            if motor < available {
                self.board.set_level(motor, RESPONSE_CURVE[value as usize]);
            }
        }
        ControlFlow::Continue(())
    }

    fn on_stop(&mut self) {
        self.mute_all();
        info!("glove muted");
    }
}

/// Motor board that prints drive levels instead of vibrating.
///
/// One hex row per grid row, bench-test style.
pub struct ConsoleBoard {
    levels: Vec<u8>,
    row_width: usize,
}

impl ConsoleBoard {
    pub fn new(motor_count: usize, row_width: usize) -> Self {
        Self {
            levels: vec![0; motor_count],
            row_width,
        }
    }

    pub fn levels(&self) -> &[u8] {
        &self.levels
    }
}

impl MotorBoard for ConsoleBoard {
    fn set_level(&mut self, motor: usize, level: u8) {
        self.levels[motor] = level;
        // Print once per full refresh, after the last motor settles
        if motor == self.levels.len() - 1 {
            for row in self.levels.chunks(self.row_width) {
                let line: Vec<String> = row.iter().map(|l| format!("0x{l:02x}")).collect();
                info!("{}", line.join(" "));
            }
        }
    }

    fn motor_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Board that records every write.
    struct RecordingBoard {
        levels: Arc<Mutex<Vec<u8>>>,
        writes: Arc<Mutex<Vec<(usize, u8)>>>,
    }

    impl RecordingBoard {
        fn new(count: usize) -> (Self, Arc<Mutex<Vec<u8>>>, Arc<Mutex<Vec<(usize, u8)>>>) {
            let levels = Arc::new(Mutex::new(vec![0u8; count]));
            let writes = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    levels: Arc::clone(&levels),
                    writes: Arc::clone(&writes),
                },
                levels,
                writes,
            )
        }
    }

    impl MotorBoard for RecordingBoard {
        fn set_level(&mut self, motor: usize, level: u8) {
            self.levels.lock()[motor] = level;
            self.writes.lock().push((motor, level));
        }

        fn motor_count(&self) -> usize {
            self.levels.lock().len()
        }
    }

    #[test]
    fn response_curve_boundaries() {
        assert_eq!(RESPONSE_CURVE[0], 0, "off stays off");
        assert_eq!(RESPONSE_CURVE[1], 20, "faintest level jumps past the dead zone");
        assert_eq!(RESPONSE_CURVE[255], 255, "full drive");
    }

    #[test]
    fn response_curve_is_monotonic() {
        for window in RESPONSE_CURVE.windows(2) {
            assert!(window[0] <= window[1], "curve must never dip");
        }
    }

    #[test]
    fn cells_route_through_the_wiring_order() {
        let (board, levels, _) = RecordingBoard::new(9);
        let mut driver = GloveDriver::new(board);

        // Distinct value per cell so routing is visible
        let grid = Arc::new(TileGrid::new(3, vec![0, 10, 20, 30, 40, 50, 60, 70, 80], 0));
        driver.on_frame(grid);

        let levels = levels.lock();
        for (cell, &value) in [0u8, 10, 20, 30, 40, 50, 60, 70, 80].iter().enumerate() {
            let motor = MOTOR_ORDER_3X3[cell];
            assert_eq!(
                levels[motor], RESPONSE_CURVE[value as usize],
                "cell {cell} must land on motor {motor}"
            );
        }
    }

    #[test]
    fn non_3x3_grids_map_cells_directly() {
        let (board, levels, _) = RecordingBoard::new(4);
        let mut driver = GloveDriver::new(board);

        driver.on_frame(Arc::new(TileGrid::new(2, vec![0, 51, 102, 204], 0)));

        let levels = levels.lock();
        assert_eq!(levels[0], RESPONSE_CURVE[0]);
        assert_eq!(levels[1], RESPONSE_CURVE[51]);
        assert_eq!(levels[2], RESPONSE_CURVE[102]);
        assert_eq!(levels[3], RESPONSE_CURVE[204]);
    }

    #[test]
    fn oversized_grid_skips_missing_motors() {
        // 4x4 grid onto a 9-motor board: the extra cells are dropped
        let (board, _, writes) = RecordingBoard::new(9);
        let mut driver = GloveDriver::new(board);

        driver.on_frame(Arc::new(TileGrid::new(4, vec![100; 16], 0)));

        assert!(writes.lock().iter().all(|&(motor, _)| motor < 9));
    }

    #[test]
    fn stop_mutes_every_motor() {
        let (board, levels, _) = RecordingBoard::new(9);
        let mut driver = GloveDriver::new(board);

        driver.on_frame(Arc::new(TileGrid::new(3, vec![200; 9], 0)));
        assert!(levels.lock().iter().all(|&l| l > 0));

        driver.on_stop();
        assert!(levels.lock().iter().all(|&l| l == 0), "glove must go quiet");
    }

    #[test]
    fn console_board_tracks_levels() {
        let mut board = ConsoleBoard::new(9, 3);
        for motor in 0..9 {
            board.set_level(motor, motor as u8 * 10);
        }
        assert_eq!(board.levels()[4], 40);
        assert_eq!(board.motor_count(), 9);
    }
}
