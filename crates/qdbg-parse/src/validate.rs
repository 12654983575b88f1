//! Register declarations, target validation and scope tracking.

use rustc_hash::{FxHashMap, FxHashSet};

use qdbg_ir::Assertion;

/// Names visible while preprocessing one run of instructions.
///
/// A gate body gets a child scope from [`Scope::enter_function`]. Registers
/// are global, so the child's register table is handed back with
/// [`Scope::leave_function`] once the body is done.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    registers: FxHashMap<String, usize>,
    functions: FxHashSet<String>,
    shadowed: Vec<String>,
}

impl Scope {
    /// An empty top-level scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a register. A redeclaration keeps the first size.
    pub fn declare_register(&mut self, name: impl Into<String>, size: usize) {
        self.registers.entry(name.into()).or_insert(size);
    }

    /// Declared size of a register.
    pub fn register_size(&self, name: &str) -> Option<usize> {
        self.registers.get(name).copied()
    }

    /// Consume the scope, keeping only the register table.
    pub fn into_registers(self) -> FxHashMap<String, usize> {
        self.registers
    }

    /// Check whether `name` is a formal parameter of the enclosing gate.
    pub fn is_shadowed(&self, name: &str) -> bool {
        self.shadowed.iter().any(|s| s == name)
    }

    pub fn add_functions(&mut self, names: impl IntoIterator<Item = String>) {
        self.functions.extend(names);
    }

    pub fn knows_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }

    /// Scope for the body of a gate with the given formal parameters.
    pub fn enter_function(&self, parameters: &[String]) -> Self {
        Self {
            registers: self.registers.clone(),
            functions: self.functions.clone(),
            shadowed: parameters.to_vec(),
        }
    }

    /// Take back the register table of a finished gate body.
    pub fn leave_function(&mut self, body: Self) {
        self.registers = body.registers;
    }
}

/// Why an operand list was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetViolation {
    /// An operand is the empty string.
    Empty,
    /// The operand is malformed or refers past its register.
    Invalid(String),
}

/// Validate operands against the registers visible in `scope`.
///
/// Operands without an index are accepted as they are. An indexed operand
/// `name[idx]` needs a non-empty `name`, a closing bracket at the very end
/// and an all-digit `idx`. Unless `name` is shadowed, it must be a declared
/// register larger than `idx`.
pub fn check_targets<S: AsRef<str>>(targets: &[S], scope: &Scope) -> Result<(), TargetViolation> {
    for target in targets {
        let target = target.as_ref();
        if target.is_empty() {
            return Err(TargetViolation::Empty);
        }
        let Some(open) = target.find('[') else {
            continue;
        };

        let invalid = || TargetViolation::Invalid(target.to_string());
        let close = target[open + 1..].find(']').map(|i| open + 1 + i);
        if open == 0 || close != Some(target.len() - 1) {
            return Err(invalid());
        }

        let index_text = &target[open + 1..target.len() - 1];
        if !is_digits(index_text) {
            return Err(invalid());
        }
        let index: usize = index_text.parse().map_err(|_| invalid())?;

        let name = &target[..open];
        if scope.is_shadowed(name) {
            continue;
        }
        match scope.register_size(name) {
            Some(size) if index < size => {}
            _ => return Err(invalid()),
        }
    }
    Ok(())
}

/// Parse `qreg name[size];` / `creg name[size];` into name and size.
///
/// Returns `None` if the name is empty or the size is not a natural number.
pub fn parse_register_declaration(declaration: &str) -> Option<(String, usize)> {
    let declaration = declaration.trim();
    let body = declaration
        .strip_prefix("qreg")
        .or_else(|| declaration.strip_prefix("creg"))
        .unwrap_or(declaration);
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();

    let (name, rest) = compact.split_once('[')?;
    let size_text = rest.split(']').next().unwrap_or_default();
    if name.is_empty() || !is_digits(size_text) {
        return None;
    }
    let size = size_text.parse().ok()?;
    Some((name.to_string(), size))
}

/// Expand bare register names in an assertion's targets to every index.
///
/// `assert-ent q;` with `qreg q[3]` targets `q[0], q[1], q[2]`. Shadowed
/// names and unknown names are left alone. The assertion is only touched if
/// something was expanded.
pub fn unfold_assertion_targets(assertion: &mut dyn Assertion, scope: &Scope) {
    let mut unfolded = false;
    let mut targets = Vec::new();

    for target in assertion.target_qubits() {
        if scope.is_shadowed(target) {
            targets.push(target.clone());
            continue;
        }
        match scope.register_size(target) {
            Some(size) => {
                targets.extend((0..size).map(|i| format!("{target}[{i}]")));
                unfolded = true;
            }
            None => targets.push(target.clone()),
        }
    }

    if unfolded {
        assertion.set_target_qubits(targets);
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}
