//! The wrapper module, which maps field ports onto the register engine's
//! `REGIN`/`REGOUT` word arrays.

use model::{
    Model,
    field::{FieldPort, access::Direction},
    register::REGISTER_WIDTH,
};

use crate::{
    bus,
    verilog::{Assign, Connection, Declaration, Instance, ModulePort, VerilogWriter},
};

/// Register file words driven by user logic.
pub const REGISTERS_IN: &str = "csri";
/// Register file words driven by the engine.
pub const REGISTERS_OUT: &str = "csro";

/// Every field port of the wrapper, in packing order.
pub fn field_ports(model: &Model) -> impl Iterator<Item = FieldPort> + '_ {
    model.fields().flat_map(|field| field.ports())
}

fn module_port(port: &FieldPort) -> ModulePort {
    let module_port = ModulePort::new(&port.ident, port.direction, port.width as u32);

    if port.count > 1 {
        module_port.array(port.count)
    } else {
        module_port
    }
}

pub fn render(model: &Model) -> String {
    let name = model.vlnv().module_name();
    let count = model.register_count() as u32;

    let mut writer = VerilogWriter::new().header([
        format!("{name}: register map wrapper for {}", model.vlnv()),
        "Generated by csrgen. Do not edit.".to_string(),
    ]);

    for port in bus::system_ports() {
        writer.add(port);
    }

    for port in field_ports(model) {
        writer.add(module_port(&port));
    }

    for signal in &bus::AHB3_LITE {
        writer.add(signal.port());
    }

    writer.add(Declaration::wire(REGISTERS_IN, REGISTER_WIDTH as u32).array(count));
    writer.add(Declaration::wire(REGISTERS_OUT, REGISTER_WIDTH as u32).array(count));

    for field in model.fields() {
        let ports = field.ports();

        for placement in field.placements() {
            let word = |array: &str| format!("{array}[{}]{}", placement.word(), placement.slice());

            for port in &ports {
                let signal = port.replica(placement.replica);

                match port.direction {
                    Direction::Input => writer.add(Assign::new(word(REGISTERS_IN), signal)),
                    Direction::Output => writer.add(Assign::new(signal, word(REGISTERS_OUT))),
                }
            }
        }
    }

    writer.add(engine(model));

    writer.render_module(name)
}

/// The register engine instance, sized to the register count.
fn engine(model: &Model) -> Instance {
    Instance::new(bus::ENGINE, format!("u_{}", model.vlnv().module_name()))
        .parameters([Connection::new("CNT", model.register_count().to_string())])
        .ports([
            Connection::direct(bus::CLOCK),
            Connection::direct(bus::RESET),
            Connection::new("REGIN", REGISTERS_IN),
            Connection::new("REGOUT", REGISTERS_OUT),
            Connection::new("ACCESS", model.access_vector().to_string()),
        ])
        .ports(bus::connections(None))
}
