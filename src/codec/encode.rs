use super::Escaped;
use crate::core::CpNet;
use std::fmt;

const HEADER: &str = "<?xml version='1.0' encoding='us-ascii'?>\n<PREFERENCE-SPECIFICATION>\n";
const FOOTER: &str = "</PREFERENCE-SPECIFICATION>";

/// Display adapter rendering a net as a preference-specification document.
pub struct Document<'a>(pub &'a CpNet);

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let net = self.0;
        f.write_str(HEADER)?;

        for (_, variable) in net.variables() {
            writeln!(f, "  <PREFERENCE-VARIABLE>")?;
            writeln!(f, "    <VARIABLE-NAME>{}</VARIABLE-NAME>", Escaped(variable.name()))?;
            for value in variable.domain().values() {
                writeln!(f, "    <DOMAIN-VALUE>{}</DOMAIN-VALUE>", Escaped(value))?;
            }
            writeln!(f, "  </PREFERENCE-VARIABLE>")?;
        }

        for (i, (_, variable)) in net.variables().enumerate() {
            let domain = variable.domain();
            for (j, entry) in variable.entries().enumerate() {
                writeln!(f, "  <PREFERENCE-STATEMENT>")?;
                writeln!(f, "    <STATEMENT-ID>v{i}_p{j}</STATEMENT-ID>")?;
                writeln!(
                    f,
                    "    <PREFERENCE-VARIABLE>{}</PREFERENCE-VARIABLE>",
                    Escaped(variable.name())
                )?;
                for (&parent, &index) in variable.parents().iter().zip(&entry.condition) {
                    let Some(parent) = net.variable(parent) else {
                        continue;
                    };
                    writeln!(
                        f,
                        "    <CONDITION>{}={}</CONDITION>",
                        Escaped(parent.name()),
                        Escaped(parent.domain().get(index).unwrap_or_default())
                    )?;
                }
                if domain.len() == 1 {
                    writeln!(
                        f,
                        "    <PREFERENCE>{}</PREFERENCE>",
                        Escaped(domain.get(0).unwrap_or_default())
                    )?;
                } else {
                    for pair in entry.leaf.ranked().windows(2) {
                        writeln!(
                            f,
                            "    <PREFERENCE>{}:{}</PREFERENCE>",
                            Escaped(domain.get(pair[0].value).unwrap_or_default()),
                            Escaped(domain.get(pair[1].value).unwrap_or_default())
                        )?;
                    }
                }
                writeln!(f, "  </PREFERENCE-STATEMENT>")?;
            }
        }

        f.write_str(FOOTER)
    }
}

/// Serializes the net's members, in net order, with one statement per CPT
/// leaf. Statement ids are `v{variable}_p{leaf}`.
pub fn encode(net: &CpNet) -> String {
    let text = Document(net).to_string();
    tracing::debug!(variables = net.len(), bytes = text.len(), "encoded net");
    text
}
