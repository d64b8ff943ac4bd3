#![allow(clippy::disallowed_names)]

use csrgen_model::{Access, Field, Model, error::Error};

/// Pack a model named `acme:csr:<name>:1.0` from the given fields.
pub fn packed(
    name: &str,
    instance: Option<&str>,
    fields: impl IntoIterator<Item = Field>,
) -> Result<Model, Error> {
    let mut model = Model::new(
        format!("acme:csr:{name}:1.0").parse()?,
        instance.map(str::to_string),
    )
    .with_fields(fields);

    model.pack()?;

    Ok(model)
}

/// Two read-write bytes and a read-only nibble.
pub fn mixed() -> Result<Model, Error> {
    packed(
        "mixed",
        None,
        [
            Field::new("a", 8, Access::ReadWrite),
            Field::new("b", 8, Access::ReadWrite),
            Field::new("c", 4, Access::Read),
        ],
    )
}

/// A full-width write-only word followed by a single write-only bit.
pub fn full_word() -> Result<Model, Error> {
    packed(
        "full_word",
        None,
        [
            Field::new("x", 32, Access::Write),
            Field::new("y", 1, Access::Write),
        ],
    )
}

/// One replicated read-write field.
pub fn replicated() -> Result<Model, Error> {
    packed(
        "replicated",
        None,
        [Field::new("z", 4, Access::ReadWrite).count(3)],
    )
}

/// A UART-like peripheral touching every access kind.
pub fn uart() -> Result<Model, Error> {
    packed(
        "uart_csr",
        Some("uart0"),
        [
            Field::new("divisor", 16, Access::ReadWrite),
            Field::new("parity", 2, Access::ReadWrite),
            Field::new("stop_bits", 1, Access::ReadWrite),
            Field::new("rx_data", 8, Access::Read),
            Field::new("rx_level", 5, Access::Read),
            Field::new("tx_data", 8, Access::Write),
            Field::new("irq", 1, Access::WriteOneClear).count(4),
            Field::new("fifo", 12, Access::Read).count(3),
        ],
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use csrgen_model::{
        diagnostic::{self, Kind},
        register::{REGISTER_STRIDE, REGISTER_WIDTH},
    };

    use super::*;

    /// (address, access, [(replica name, offset, width)])
    fn layout(model: &Model) -> Vec<(u32, Access, Vec<(String, u8, u8)>)> {
        model
            .registers()
            .map(|register| {
                (
                    register.address,
                    register.access,
                    register
                        .occupants()
                        .map(|(field, occupant)| {
                            (
                                field.replica_name(occupant.replica),
                                occupant.offset,
                                occupant.width,
                            )
                        })
                        .collect(),
                )
            })
            .collect()
    }

    fn entry(name: &str, offset: u8, width: u8) -> (String, u8, u8) {
        (name.to_string(), offset, width)
    }

    mod scenarios {
        use super::*;

        /// The `ro` register sorts ahead of the `rw` one.
        #[test]
        fn mixed_access() {
            let model = mixed().unwrap();

            assert_eq!(
                layout(&model),
                [
                    (0, Access::Read, vec![entry("c", 0, 4)]),
                    (4, Access::ReadWrite, vec![entry("a", 0, 8), entry("b", 8, 8)]),
                ]
            );
            assert_eq!(model.access_vector().concatenation(), "{2'b00,2'b01}");
            assert_eq!(model.access_vector().to_string(), "4'b0001");
        }

        #[test]
        fn full_word_spills() {
            let model = full_word().unwrap();

            assert_eq!(
                layout(&model),
                [
                    (0, Access::Write, vec![entry("x", 0, 32)]),
                    (4, Access::Write, vec![entry("y", 0, 1)]),
                ]
            );
        }

        #[test]
        fn replicas_share_a_register() {
            let model = replicated().unwrap();

            assert_eq!(
                layout(&model),
                [(
                    0,
                    Access::ReadWrite,
                    vec![entry("z[0]", 0, 4), entry("z[1]", 4, 4), entry("z[2]", 8, 4)]
                )]
            );
        }

        /// An over-wide field is rejected before anything is written.
        #[test]
        fn width_exceeded() {
            let dir = tempfile::tempdir().unwrap();
            let mut model = Model::new("acme:csr:wide:1.0".parse().unwrap(), None)
                .with_fields([Field::new("wide", 40, Access::ReadWrite)]);

            let Err(Error::Validation(diagnostics)) = model.pack() else {
                panic!("expected packing to fail");
            };

            assert_eq!(*diagnostics.first().unwrap().kind(), Kind::WidthExceeded);
            assert!(matches!(
                csrgen_build::generate(&model, dir.path()),
                Err(csrgen_build::Error::Unpacked)
            ));
            assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        }

        #[test]
        fn unknown_access() {
            let diagnostics = Field::from_properties(
                "foo",
                [("type", csrgen_model::field::Property::Text("rwx".to_string()))],
            )
            .unwrap_err();

            let message = diagnostics.first().unwrap().message();

            assert!(message.contains("rwx"));
            assert!(message.contains("{ro, rw, wo, w1c}"));
        }
    }

    mod properties {
        use super::*;

        fn models() -> Vec<Model> {
            vec![
                mixed().unwrap(),
                full_word().unwrap(),
                replicated().unwrap(),
                uart().unwrap(),
            ]
        }

        #[test]
        fn no_overflow() {
            for model in models() {
                for register in model.registers() {
                    let occupied = register
                        .occupants()
                        .map(|(_, occupant)| occupant.width as u32)
                        .sum::<u32>();

                    assert!(occupied <= REGISTER_WIDTH as u32);
                }
            }
        }

        #[test]
        fn kind_purity() {
            for model in models() {
                for register in model.registers() {
                    assert!(
                        register
                            .occupants()
                            .all(|(field, _)| field.access == register.access)
                    );
                }
            }
        }

        #[test]
        fn addresses_are_contiguous() {
            for model in models() {
                for (i, register) in model.registers().enumerate() {
                    assert_eq!(register.address, i as u32 * REGISTER_STRIDE);
                }
            }
        }

        /// Every replica has exactly one slot and no two slots overlap.
        #[test]
        fn total_coverage() {
            for model in models() {
                let placed = model
                    .registers()
                    .map(|register| register.occupants().count())
                    .sum::<usize>();

                assert_eq!(placed, model.replica_count());

                for field in model.fields() {
                    assert_eq!(field.placements().count(), field.count as usize);
                }

                for register in model.registers() {
                    let mut bits = 0u64;

                    for (_, occupant) in register.occupants() {
                        let mask = ((1u64 << occupant.width) - 1) << occupant.offset;

                        assert_eq!(bits & mask, 0);
                        bits |= mask;
                    }
                }
            }
        }

        #[test]
        fn access_vector_length() {
            for model in models() {
                let vector = model.access_vector();

                assert_eq!(vector.bit_len(), 2 * model.register_count());

                for (i, access) in vector.groups() {
                    assert_eq!(
                        model.registers().nth(i).map(|register| register.access),
                        Some(access)
                    );
                }
            }
        }

        #[test]
        fn self_validates() {
            for model in models() {
                assert_eq!(diagnostic::tally(&model.validate()), (0, 0));
            }
        }
    }

    mod emission {
        use super::*;

        /// Identical input yields byte-identical artifacts.
        #[test]
        fn deterministic() {
            let first = tempfile::tempdir().unwrap();
            let second = tempfile::tempdir().unwrap();

            let written = csrgen_build::generate(&uart().unwrap(), first.path()).unwrap();
            csrgen_build::generate(&uart().unwrap(), second.path()).unwrap();

            for path in written {
                let name = path.file_name().unwrap();

                assert_eq!(
                    fs::read(&path).unwrap(),
                    fs::read(second.path().join(name)).unwrap()
                );
            }
        }

        #[test]
        fn uart_wrapper() {
            let model = uart().unwrap();
            let artifacts = csrgen_build::render(&model).unwrap();
            let sv = &artifacts["uart_csr.sv"];
            let vh = &artifacts["uart_csr.vh"];

            assert!(sv.contains("module uart_csr ("));
            assert!(sv.contains(&format!(".CNT({})", model.register_count())));
            assert!(sv.contains(&format!(".ACCESS({})", model.access_vector())));
            assert!(sv.contains("input  wire [11:0] fifo [3]"));
            assert!(sv.contains("output wire [7:0] tx_data"));
            assert!(sv.contains("assign irq_o[3] = csro["));

            assert!(vh.contains("uart_csr uart_csr0 ("));
            assert!(vh.contains(".HWDATA(uart0_HWDATA)"));
            assert!(vh.contains("logic irq_i [4];"));
        }

        #[test]
        fn refuses_empty() {
            let dir = tempfile::tempdir().unwrap();
            let model = packed("empty", None, []).unwrap();

            assert!(csrgen_build::generate(&model, dir.path()).is_err());
            assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        }
    }
}
