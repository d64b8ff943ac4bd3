//! The instantiation template: signal declarations and a wrapper instance
//! ready to be included into the parent design.

use model::{Model, field::FieldPort};

use crate::{
    bus,
    verilog::{Connection, Declaration, Instance, VerilogWriter},
    wrapper,
};

fn declaration(port: &FieldPort) -> Declaration {
    let declaration = Declaration::logic(&port.ident, port.width as u32);

    if port.count > 1 {
        declaration.array(port.count)
    } else {
        declaration
    }
}

pub fn render(model: &Model) -> String {
    let name = model.vlnv().module_name();
    let ports = wrapper::field_ports(model).collect::<Vec<_>>();

    let mut writer = VerilogWriter::new().header([format!(
        "{name}: instantiation template for {}",
        model.vlnv()
    )]);

    for port in &ports {
        writer.add(declaration(port));
    }

    writer.add(
        Instance::new(name, format!("{name}0"))
            .ports([
                Connection::direct(bus::CLOCK),
                Connection::direct(bus::RESET),
            ])
            .ports(bus::connections(model.instance().as_deref()))
            .ports(ports.iter().map(|port| Connection::direct(&port.ident))),
    );

    writer.render_include()
}
