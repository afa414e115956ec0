//! Nested-scope symbol table backed by a flat arena.
//!
//! Scope layers form a tree rooted at the global scope (level 0).  Every
//! layer lives in one arena and is addressed by [`ScopeId`]; a `Proc` symbol
//! carries the id of the layer holding its parameters and locals.  Layers are
//! never destroyed: after parsing, the interpreter walks the same tree to
//! size activation records at call time.
//!
//! Name resolution is a breadth-first walk from the root, not the classical
//! innermost-first climb along the static chain.  On a name collision the
//! outermost definition wins, and a procedure can resolve siblings declared
//! anywhere in an enclosing layer.  Callers depend on both properties.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic failures raised by table operations.  All are fatal and carry the
/// source row the parser was at.
#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("[row {row}] identifier '{name}' is already defined in this scope")]
    DuplicateDefinition { name: String, row: u32 },
    #[error("[row {row}] identifier '{name}' is not defined")]
    Undefined { name: String, row: u32 },
    #[error("[row {row}] identifier '{name}' cannot be used here")]
    TypeMismatch { name: String, row: u32 },
    #[error("[row {row}] procedure '{name}' called with {actual} arguments, expects {expected}")]
    ParamCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
        row: u32,
    },
    #[error("cannot leave the global scope")]
    ScopeUnderflow,
}

/// Handle into the scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

/// Stable handle to a `Proc` symbol, used to link it to its inner layer.
#[derive(Debug, Clone, Copy)]
pub struct ProcHandle {
    scope: ScopeId,
    index: usize,
}

/// Per-kind symbol attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SymbolKind {
    Const {
        value: i64,
    },
    Var {
        offset: i32,
    },
    Param {
        offset: i32,
    },
    Proc {
        param_count: usize,
        /// -1 until the procedure's body starts emitting code.
        entry_address: i64,
        inner_scope: ScopeId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    /// Level of the scope that owns the symbol.
    pub level: i32,
    pub kind: SymbolKind,
}

/// One scope layer: its symbols in insertion order plus the running offset
/// counters the frame layout is derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub level: i32,
    pub parent: Option<ScopeId>,
    /// Owning procedure's name; "program" for the root until `_prog` renames it.
    pub owner: String,
    symbols: Vec<Symbol>,
    var_offset: i32,
    param_count: usize,
}

impl Scope {
    fn new(level: i32, parent: Option<ScopeId>) -> Self {
        Self {
            level,
            parent,
            owner: "program".to_owned(),
            symbols: Vec::new(),
            var_offset: 0,
            param_count: 0,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Total data cells of an activation for this scope: params then vars.
    pub fn frame_slots(&self) -> i32 {
        self.var_offset
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }

    fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|symbol| symbol.name == name)
    }
}

/// The scope tree plus the cursor state the parser drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,
    #[serde(skip, default = "initial_row")]
    row: u32,
}

fn initial_row() -> u32 {
    1
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(0, None)],
            current: ScopeId(0),
            row: 1,
        }
    }

    pub fn root(&self) -> &Scope {
        &self.scopes[0]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn current_scope_id(&self) -> ScopeId {
        self.current
    }

    pub fn current_level(&self) -> i32 {
        self.scope(self.current).level
    }

    /// Source row attached to subsequent diagnostics.
    pub fn set_row(&mut self, row: u32) {
        self.row = row;
    }

    pub fn current_row(&self) -> u32 {
        self.row
    }

    pub fn set_owner(&mut self, id: ScopeId, name: &str) {
        self.scopes[id.0 as usize].owner = name.to_owned();
    }

    fn check_duplicate(&self, name: &str) -> Result<(), SemanticError> {
        if self.scope(self.current).find(name).is_some() {
            return Err(SemanticError::DuplicateDefinition {
                name: name.to_owned(),
                row: self.row,
            });
        }
        Ok(())
    }

    fn current_mut(&mut self) -> &mut Scope {
        let id = self.current.0 as usize;
        &mut self.scopes[id]
    }

    pub fn insert_const(&mut self, name: &str, value: i64) -> Result<(), SemanticError> {
        self.check_duplicate(name)?;
        let level = self.current_level();
        self.current_mut().symbols.push(Symbol {
            name: name.to_owned(),
            level,
            kind: SymbolKind::Const { value },
        });
        Ok(())
    }

    pub fn insert_var(&mut self, name: &str) -> Result<(), SemanticError> {
        self.check_duplicate(name)?;
        let level = self.current_level();
        let scope = self.current_mut();
        let offset = scope.var_offset;
        scope.var_offset += 1;
        scope.symbols.push(Symbol {
            name: name.to_owned(),
            level,
            kind: SymbolKind::Var { offset },
        });
        Ok(())
    }

    /// Parameters share the var offset space and always precede vars, so the
    /// var counter advances along with the param counter.
    pub fn insert_param(&mut self, name: &str) -> Result<(), SemanticError> {
        self.check_duplicate(name)?;
        let level = self.current_level();
        let scope = self.current_mut();
        let offset = scope.param_count as i32;
        scope.param_count += 1;
        scope.var_offset += 1;
        scope.symbols.push(Symbol {
            name: name.to_owned(),
            level,
            kind: SymbolKind::Param { offset },
        });
        Ok(())
    }

    /// The inner scope is linked up separately, once it exists; until then the
    /// handle points the symbol at the (not yet valid) next arena slot.
    pub fn insert_proc(&mut self, name: &str, param_count: usize) -> Result<ProcHandle, SemanticError> {
        self.check_duplicate(name)?;
        let level = self.current_level();
        let placeholder = ScopeId(self.scopes.len() as u32);
        let scope_id = self.current;
        let scope = self.current_mut();
        let index = scope.symbols.len();
        scope.symbols.push(Symbol {
            name: name.to_owned(),
            level,
            kind: SymbolKind::Proc {
                param_count,
                entry_address: -1,
                inner_scope: placeholder,
            },
        });
        Ok(ProcHandle {
            scope: scope_id,
            index,
        })
    }

    /// Allocate a child layer of the current one and make it current.
    pub fn enter_proc_layer(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let level = self.current_level() + 1;
        self.scopes.push(Scope::new(level, Some(self.current)));
        self.current = id;
        id
    }

    pub fn exit_proc_layer(&mut self) -> Result<(), SemanticError> {
        match self.scope(self.current).parent {
            Some(parent) => {
                self.current = parent;
                Ok(())
            }
            None => Err(SemanticError::ScopeUnderflow),
        }
    }

    pub fn bind_inner_scope(&mut self, handle: ProcHandle, inner: ScopeId) {
        let symbol = &mut self.scopes[handle.scope.0 as usize].symbols[handle.index];
        if let SymbolKind::Proc { inner_scope, .. } = &mut symbol.kind {
            *inner_scope = inner;
        }
    }

    /// Back-patch the entry address of the procedure owning `scope`.  A no-op
    /// for the root, which has no owning `Proc` symbol.
    pub fn fill_entry(&mut self, scope: ScopeId, entry: i64) {
        let Some(parent) = self.scope(scope).parent else {
            return;
        };
        for symbol in &mut self.scopes[parent.0 as usize].symbols {
            if let SymbolKind::Proc {
                inner_scope,
                entry_address,
                ..
            } = &mut symbol.kind
            {
                if *inner_scope == scope {
                    *entry_address = entry;
                    return;
                }
            }
        }
    }

    /// Resolve `name` breadth-first from the root; the shallowest defining
    /// layer wins.  Returns the symbol and the level difference between the
    /// use site and the defining layer.
    pub fn find_global(&self, name: &str) -> Result<(&Symbol, i32), SemanticError> {
        let use_level = self.current_level();
        let mut queue = VecDeque::from([ScopeId(0)]);
        while let Some(id) = queue.pop_front() {
            let scope = self.scope(id);
            if let Some(symbol) = scope.find(name) {
                return Ok((symbol, use_level - symbol.level));
            }
            for symbol in &scope.symbols {
                if let SymbolKind::Proc { inner_scope, .. } = symbol.kind {
                    queue.push_back(inner_scope);
                }
            }
        }
        Err(SemanticError::Undefined {
            name: name.to_owned(),
            row: self.row,
        })
    }

    /// Locate the scope of the procedure whose body starts at `entry`.  The
    /// interpreter calls this at `CAL` to size the new activation.
    pub fn find_proc_by_entry(&self, entry: i64) -> Option<ScopeId> {
        let mut queue = VecDeque::from([ScopeId(0)]);
        while let Some(id) = queue.pop_front() {
            for symbol in &self.scope(id).symbols {
                if let SymbolKind::Proc {
                    entry_address,
                    inner_scope,
                    ..
                } = symbol.kind
                {
                    if entry_address == entry {
                        return Some(inner_scope);
                    }
                    queue.push_back(inner_scope);
                }
            }
        }
        None
    }

    /// Build a [`SemanticError::TypeMismatch`] at the current row.
    pub fn type_mismatch(&self, name: &str) -> SemanticError {
        SemanticError::TypeMismatch {
            name: name.to_owned(),
            row: self.row,
        }
    }
}
