//! A small structured writer for SystemVerilog text.
//!
//! Items are collected first and rendered in a fixed section order (ports,
//! declarations, assignments, instances) so the output only depends on the
//! order items were added.

use model::field::access::Direction;

const INDENT: &str = "    ";

/// `[msb:0] ` for multi-bit vectors, nothing for single bits.
fn packed_range(width: u32) -> String {
    if width > 1 {
        format!("[{}:0] ", width - 1)
    } else {
        String::new()
    }
}

/// ` [depth]` for arrays, nothing for scalars.
fn unpacked_range(depth: Option<u32>) -> String {
    depth.map(|depth| format!(" [{depth}]")).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePort {
    pub ident: String,
    pub direction: Direction,
    pub width: u32,
    pub depth: Option<u32>,
}

impl ModulePort {
    pub fn new(ident: impl Into<String>, direction: Direction, width: u32) -> Self {
        Self {
            ident: ident.into(),
            direction,
            width,
            depth: None,
        }
    }

    /// Declare an unpacked array of `depth` elements.
    pub fn array(self, depth: u32) -> Self {
        Self {
            depth: Some(depth),
            ..self
        }
    }

    fn render(&self) -> String {
        let direction = match self.direction {
            Direction::Input => "input ",
            Direction::Output => "output",
        };

        format!(
            "{direction} wire {}{}{}",
            packed_range(self.width),
            self.ident,
            unpacked_range(self.depth)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Net {
    Wire,
    Logic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub net: Net,
    pub ident: String,
    pub width: u32,
    pub depth: Option<u32>,
}

impl Declaration {
    pub fn wire(ident: impl Into<String>, width: u32) -> Self {
        Self {
            net: Net::Wire,
            ident: ident.into(),
            width,
            depth: None,
        }
    }

    pub fn logic(ident: impl Into<String>, width: u32) -> Self {
        Self {
            net: Net::Logic,
            ..Self::wire(ident, width)
        }
    }

    /// Declare an unpacked array of `depth` elements.
    pub fn array(self, depth: u32) -> Self {
        Self {
            depth: Some(depth),
            ..self
        }
    }

    fn render(&self) -> String {
        let net = match self.net {
            Net::Wire => "wire",
            Net::Logic => "logic",
        };

        format!(
            "{net} {}{}{};",
            packed_range(self.width),
            self.ident,
            unpacked_range(self.depth)
        )
    }
}

/// A continuous assignment `assign lhs = rhs;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    pub lhs: String,
    pub rhs: String,
}

impl Assign {
    pub fn new(lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }
}

/// A named connection `.name(value)`, used for both parameters and ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub name: String,
    pub value: String,
}

impl Connection {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Connect a port to the signal of the same name.
    pub fn direct(name: impl Into<String>) -> Self {
        let name = name.into();

        Self {
            value: name.clone(),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub module: String,
    pub ident: String,
    pub parameters: Vec<Connection>,
    pub ports: Vec<Connection>,
}

impl Instance {
    pub fn new(module: impl Into<String>, ident: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ident: ident.into(),
            parameters: Vec::new(),
            ports: Vec::new(),
        }
    }

    pub fn parameters(mut self, parameters: impl IntoIterator<Item = Connection>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn ports(mut self, ports: impl IntoIterator<Item = Connection>) -> Self {
        self.ports.extend(ports);
        self
    }

    fn render(&self, indent: &str) -> String {
        let connections = |connections: &[Connection]| {
            connections
                .iter()
                .map(|c| format!("{indent}{INDENT}.{}({})", c.name, c.value))
                .collect::<Vec<_>>()
                .join(",\n")
        };

        let mut s = format!("{indent}{}", self.module);

        if !self.parameters.is_empty() {
            s.push_str(&format!(
                " #(\n{}\n{indent})",
                connections(&self.parameters)
            ));
        }

        s.push_str(&format!(
            " {} (\n{}\n{indent});\n",
            self.ident,
            connections(&self.ports)
        ));

        s
    }
}

/// Anything that can be added to a [`VerilogWriter`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub enum Item {
    Port(ModulePort),
    Declaration(Declaration),
    Assign(Assign),
    Instance(Instance),
}

#[derive(Debug, Clone, Default)]
pub struct VerilogWriter {
    header: Vec<String>,
    ports: Vec<ModulePort>,
    declarations: Vec<Declaration>,
    assigns: Vec<Assign>,
    instances: Vec<Instance>,
}

impl VerilogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add comment lines emitted at the top of the file.
    pub fn header<I>(mut self, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.header
            .extend(lines.into_iter().map(|line| line.as_ref().to_string()));
        self
    }

    pub fn add(&mut self, item: impl Into<Item>) {
        match item.into() {
            Item::Port(port) => self.ports.push(port),
            Item::Declaration(declaration) => self.declarations.push(declaration),
            Item::Assign(assign) => self.assigns.push(assign),
            Item::Instance(instance) => self.instances.push(instance),
        }
    }

    fn render_header(&self, s: &mut String) {
        for line in &self.header {
            s.push_str(&format!("// {line}\n"));
        }

        if !self.header.is_empty() {
            s.push('\n');
        }
    }

    fn render_body(&self, s: &mut String, indent: &str) {
        let mut sections = Vec::new();

        if !self.declarations.is_empty() {
            sections.push(
                self.declarations
                    .iter()
                    .map(|d| format!("{indent}{}\n", d.render()))
                    .collect::<String>(),
            );
        }

        if !self.assigns.is_empty() {
            sections.push(
                self.assigns
                    .iter()
                    .map(|a| format!("{indent}assign {} = {};\n", a.lhs, a.rhs))
                    .collect::<String>(),
            );
        }

        for instance in &self.instances {
            sections.push(instance.render(indent));
        }

        s.push_str(&sections.join("\n"));
    }

    /// Render the items as a module named `name`.
    pub fn render_module(&self, name: &str) -> String {
        let mut s = String::new();

        self.render_header(&mut s);

        s.push_str(&format!("module {name}"));

        if self.ports.is_empty() {
            s.push_str(";\n");
        } else {
            let ports = self
                .ports
                .iter()
                .map(|port| format!("{INDENT}{}", port.render()))
                .collect::<Vec<_>>()
                .join(",\n");

            s.push_str(&format!(" (\n{ports}\n);\n"));
        }

        s.push('\n');
        self.render_body(&mut s, INDENT);
        s.push_str("\nendmodule\n");

        s
    }

    /// Render the items without a module around them, for include files.
    pub fn render_include(&self) -> String {
        let mut s = String::new();

        self.render_header(&mut s);
        self.render_body(&mut s, "");

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports() {
        assert_eq!(
            ModulePort::new("CLK", Direction::Input, 1).render(),
            "input  wire CLK"
        );
        assert_eq!(
            ModulePort::new("HRDATA", Direction::Output, 32).render(),
            "output wire [31:0] HRDATA"
        );
        assert_eq!(
            ModulePort::new("irq_i", Direction::Input, 4).array(3).render(),
            "input  wire [3:0] irq_i [3]"
        );
    }

    #[test]
    fn declarations() {
        assert_eq!(Declaration::wire("csri", 32).array(2).render(), "wire [31:0] csri [2];");
        assert_eq!(Declaration::logic("go", 1).render(), "logic go;");
    }

    #[test]
    fn module() {
        let mut writer = VerilogWriter::new().header(["generated"]);

        writer.add(ModulePort::new("a", Direction::Input, 1));
        writer.add(ModulePort::new("b", Direction::Output, 1));
        writer.add(Assign::new("b", "a"));

        assert_eq!(
            writer.render_module("buf"),
            "// generated\n\
             \n\
             module buf (\n    input  wire a,\n    output wire b\n);\n\
             \n    assign b = a;\n\
             \nendmodule\n"
        );
    }

    #[test]
    fn instance() {
        let instance = Instance::new("child", "u_child")
            .parameters([Connection::new("N", "2")])
            .ports([Connection::direct("CLK"), Connection::new("D", "q")]);

        assert_eq!(
            instance.render(""),
            "child #(\n    .N(2)\n) u_child (\n    .CLK(CLK),\n    .D(q)\n);\n"
        );
    }

    #[test]
    fn include() {
        let mut writer = VerilogWriter::new();

        writer.add(Declaration::logic("x", 8));
        writer.add(Instance::new("m", "m0").ports([Connection::direct("x")]));

        assert_eq!(
            writer.render_include(),
            "logic [7:0] x;\n\nm m0 (\n    .x(x)\n);\n"
        );
    }
}
