//! Element look-ups between atomic symbols and atomic numbers.

use std::collections::HashMap;

use lazy_static::lazy_static;
use periodic_table;

/// A struct storing a look-up of element symbols to give atomic numbers
/// and atomic masses, together with the reverse direction from atomic
/// numbers back to symbols.
pub struct ElementMap<'a> {
    /// A [`HashMap`] from a symbol string to a tuple of atomic number and atomic
    /// mass.
    pub map: HashMap<&'a str, (u32, f64)>,

    /// A [`HashMap`] from an atomic number to the corresponding symbol string.
    numbers: HashMap<u32, &'a str>,
}

impl Default for ElementMap<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementMap<'static> {
    /// Creates a new [`ElementMap`] for all elements in the periodic table.
    #[must_use]
    pub fn new() -> ElementMap<'static> {
        let mut map = HashMap::new();
        let mut numbers = HashMap::new();
        let elements = periodic_table::periodic_table();
        for element in elements {
            let mass = parse_atomic_mass(element.atomic_mass);
            map.insert(element.symbol, (element.atomic_number, mass));
            numbers.insert(element.atomic_number, element.symbol);
        }
        ElementMap { map, numbers }
    }

    /// Returns the atomic number for an element symbol, if the symbol is known.
    #[must_use]
    pub fn atomic_number(&self, symbol: &str) -> Option<u32> {
        self.map.get(symbol).map(|(number, _)| *number)
    }

    /// Returns the element symbol for an atomic number, if the number is known.
    #[must_use]
    pub fn symbol(&self, atomic_number: u32) -> Option<&'static str> {
        self.numbers.get(&atomic_number).copied()
    }
}

lazy_static! {
    /// A shared [`ElementMap`] covering the whole periodic table.
    pub static ref ELEMENT_MAP: ElementMap<'static> = ElementMap::new();
}

/// An auxiliary function that parses the atomic mass string in the format of
/// [`periodic_table`] to a single float value.
///
/// # Arguments
///
/// * `mass_str` - A string of mass value that is either `x.y(z)` where the
///     uncertain digit `z` is enclosed in parentheses, or `[x]` where `x`
///     is the mass number in place of precise experimental values.
///
/// # Returns
///
/// The numeric mass value.
fn parse_atomic_mass(mass_str: &str) -> f64 {
    let mass = mass_str.replace(&['(', ')', '[', ']'][..], "");
    mass.parse::<f64>()
        .unwrap_or_else(|_| panic!("Unable to parse atomic mass string {mass}."))
}
