//! The AHB3-Lite slave interface and the register engine behind it.

use model::field::access::Direction;

use crate::verilog::{Connection, ModulePort};

/// The register engine instantiated by every wrapper.
pub const ENGINE: &str = "ahb3lite_csr";

pub const CLOCK: &str = "CLK";
pub const RESET: &str = "RESETn";

/// A signal of the bus interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub ident: &'static str,
    pub direction: Direction,
    pub width: u32,
}

const fn signal(ident: &'static str, direction: Direction, width: u32) -> Signal {
    Signal {
        ident,
        direction,
        width,
    }
}

/// AHB3-Lite slave signals, master-driven inputs first.
pub const AHB3_LITE: [Signal; 12] = [
    signal("HSEL", Direction::Input, 1),
    signal("HADDR", Direction::Input, 32),
    signal("HWDATA", Direction::Input, 32),
    signal("HSIZE", Direction::Input, 3),
    signal("HBURST", Direction::Input, 3),
    signal("HPROT", Direction::Input, 4),
    signal("HTRANS", Direction::Input, 2),
    signal("HWRITE", Direction::Input, 1),
    signal("HREADY", Direction::Input, 1),
    signal("HRDATA", Direction::Output, 32),
    signal("HRESP", Direction::Output, 1),
    signal("HREADYOUT", Direction::Output, 1),
];

impl Signal {
    pub fn port(&self) -> ModulePort {
        ModulePort::new(self.ident, self.direction, self.width)
    }
}

/// Clock and reset ports.
pub fn system_ports() -> [ModulePort; 2] {
    [
        ModulePort::new(CLOCK, Direction::Input, 1),
        ModulePort::new(RESET, Direction::Input, 1),
    ]
}

/// Bus connections, each wired to `<prefix>_<SIGNAL>` when a prefix is given.
pub fn connections(prefix: Option<&str>) -> impl Iterator<Item = Connection> + '_ {
    AHB3_LITE.iter().map(move |signal| match prefix {
        Some(prefix) => Connection::new(signal.ident, format!("{prefix}_{}", signal.ident)),
        None => Connection::direct(signal.ident),
    })
}
