//! Descriptor-driven query and mutation of individual sections.
//!
//! Every rewriter borrows a module for the duration of a call and exposes the
//! same four operations: `select` projects matching rows, `insert` appends or
//! inserts before the unique match, `delete` removes the unique match, and
//! `update` patches every match with the fields present in the item.
//! Descriptor fields are all optional; a `None` matches any row (and, in an
//! update item, leaves the field unchanged).
//!
//! Function and global indices in descriptors use the imports-first combined
//! numbering; the rewriters convert to section offsets internally. Every
//! mutating call drives the index fixer before returning, so the module's
//! cross-section invariants hold again on return.

use crate::model::{
    Args, Code, Data, DataMode, Element, Export, ExportKind, Expression, FuncType, Global,
    GlobalType, Import, ImportKind, Instruction, Limits, Locals, Mutability, NameAssoc,
    TableType, ValType,
};
use crate::model::{BlockArgs, IfArgs, Module};
use crate::opcode;
use crate::rewriter::errors::RewriteError;
use crate::rewriter::fixer::{self, Shift};

/// A scalar constant, as carried by the single-instruction initializer
/// expressions this crate manipulates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConstValue {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl ConstValue {
    /// The value type of this constant.
    pub fn kind(self) -> ValType {
        match self {
            ConstValue::I32(_) => ValType::I32,
            ConstValue::I64(_) => ValType::I64,
            ConstValue::F32(_) => ValType::F32,
            ConstValue::F64(_) => ValType::F64,
        }
    }

    /// The `const` instruction producing this value.
    pub fn instruction(self) -> Instruction {
        match self {
            ConstValue::I32(value) => Instruction::i32_const(value),
            ConstValue::I64(value) => Instruction::i64_const(value),
            ConstValue::F32(value) => Instruction::f32_const(value),
            ConstValue::F64(value) => Instruction::f64_const(value),
        }
    }

    /// The single-instruction initializer expression for this value.
    pub fn initializer(self) -> Expression {
        Expression::new(vec![self.instruction()])
    }

    /// Reads the constant out of a single-`const` initializer expression.
    pub fn from_expression(expression: &Expression) -> Option<ConstValue> {
        match expression.instructions().first()?.args {
            Args::I32(value) => Some(ConstValue::I32(value)),
            Args::I64(value) => Some(ConstValue::I64(value)),
            Args::F32(value) => Some(ConstValue::F32(value)),
            Args::F64(value) => Some(ConstValue::F64(value)),
            _ => None,
        }
    }
}

/// True if the query field matches the value (a `None` matches anything).
fn matches<T: PartialEq>(query: &Option<T>, value: &T) -> bool {
    query.as_ref().map_or(true, |expected| expected == value)
}

/// Reduces a match set to its unique element.
fn exactly_one<T>(mut rows: Vec<T>) -> Result<T, RewriteError> {
    match rows.len() {
        0 => Err(RewriteError::NoMatch),
        1 => Ok(rows.pop().unwrap()),
        n => Err(RewriteError::AmbiguousSelector(n)),
    }
}

/// Extracts a required descriptor field.
fn required<T>(field: Option<T>, name: &'static str) -> Result<T, RewriteError> {
    field.ok_or(RewriteError::MissingField(name))
}

/// Rebuilds the nested instruction form from a flat sequence: `block`,
/// `loop`, and `if` headers are matched against their synthetic `end` and
/// `else` markers with a stack.
pub fn fold_instructions(flat: &[Instruction]) -> Result<Expression, RewriteError> {
    enum Scope {
        Block {
            opcode: u32,
            kind: crate::model::BlockType,
            parent: Vec<Instruction>,
        },
        IfThen {
            kind: crate::model::BlockType,
            parent: Vec<Instruction>,
        },
        IfElse {
            kind: crate::model::BlockType,
            then: Vec<Instruction>,
            parent: Vec<Instruction>,
        },
    }

    let mut scopes = Vec::new();
    let mut current = Vec::new();

    for instruction in flat {
        match instruction.opcode {
            opcode::BLOCK | opcode::LOOP => {
                let kind = match &instruction.args {
                    Args::Block(args) => args.kind,
                    _ => crate::model::BlockType::Empty,
                };
                scopes.push(Scope::Block {
                    opcode: instruction.opcode,
                    kind,
                    parent: std::mem::take(&mut current),
                });
            }
            opcode::IF => {
                let kind = match &instruction.args {
                    Args::If(args) => args.kind,
                    _ => crate::model::BlockType::Empty,
                };
                scopes.push(Scope::IfThen {
                    kind,
                    parent: std::mem::take(&mut current),
                });
            }
            opcode::ELSE => match scopes.pop() {
                Some(Scope::IfThen { kind, parent }) => scopes.push(Scope::IfElse {
                    kind,
                    then: std::mem::take(&mut current),
                    parent,
                }),
                _ => return Err(RewriteError::UnexpectedElse),
            },
            opcode::END => match scopes.pop() {
                Some(Scope::Block {
                    opcode,
                    kind,
                    parent,
                }) => {
                    let body = std::mem::replace(&mut current, parent);
                    current.push(Instruction::new(
                        opcode,
                        Args::Block(BlockArgs {
                            kind,
                            body: body.into(),
                        }),
                    ));
                }
                Some(Scope::IfThen { kind, parent }) => {
                    let then = std::mem::replace(&mut current, parent);
                    current.push(Instruction::new(
                        opcode::IF,
                        Args::If(IfArgs {
                            kind,
                            then: then.into(),
                            otherwise: None,
                        }),
                    ));
                }
                Some(Scope::IfElse { kind, then, parent }) => {
                    let otherwise = std::mem::replace(&mut current, parent);
                    current.push(Instruction::new(
                        opcode::IF,
                        Args::If(IfArgs {
                            kind,
                            then: then.into(),
                            otherwise: Some(otherwise.into()),
                        }),
                    ));
                }
                None => return Err(RewriteError::UnmatchedEnd),
            },
            _ => current.push(instruction.clone()),
        }
    }

    if !scopes.is_empty() {
        return Err(RewriteError::MissingEnd);
    }

    Ok(Expression::new(current))
}

/// Descriptor of a function type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypeDesc {
    pub type_index: Option<u32>,
    pub params: Option<Vec<ValType>>,
    pub results: Option<Vec<ValType>>,
}

impl TypeDesc {
    /// A descriptor matching exactly the given signature.
    pub fn signature(params: Vec<ValType>, results: Vec<ValType>) -> Self {
        TypeDesc {
            type_index: None,
            params: Some(params),
            results: Some(results),
        }
    }

    /// A descriptor matching the given type index.
    pub fn at(type_index: u32) -> Self {
        TypeDesc {
            type_index: Some(type_index),
            ..TypeDesc::default()
        }
    }
}

/// Query and mutation over the type section.
pub struct TypeRewriter<'m> {
    module: &'m mut Module,
}

impl<'m> TypeRewriter<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        TypeRewriter { module }
    }

    fn positions(&self, query: &TypeDesc) -> Vec<usize> {
        self.module
            .types
            .iter()
            .enumerate()
            .filter(|(index, kind)| {
                matches(&query.type_index, &(*index as u32))
                    && matches(&query.params, &kind.params)
                    && matches(&query.results, &kind.results)
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Every type matching the descriptor, projected as filled descriptors.
    pub fn select(&self, query: &TypeDesc) -> Vec<TypeDesc> {
        self.positions(query)
            .into_iter()
            .map(|index| {
                let kind = &self.module.types[index];
                TypeDesc {
                    type_index: Some(index as u32),
                    params: Some(kind.params.clone()),
                    results: Some(kind.results.clone()),
                }
            })
            .collect()
    }

    /// Inserts a type; appends when no query is given. Returns the index of
    /// the inserted type.
    pub fn insert(&mut self, query: Option<&TypeDesc>, item: TypeDesc) -> Result<u32, RewriteError> {
        let params = required(item.params, "params")?;
        let results = required(item.results, "results")?;
        let kind = FuncType::new(params, results);

        let index = match query {
            None => {
                self.module.types.push(kind);
                self.module.types.len() - 1
            }
            Some(query) => {
                let index = exactly_one(self.positions(query))?;
                self.module.types.insert(index, kind);
                fixer::shift_type_indices(self.module, index as u32, Shift::Insert);
                index
            }
        };

        Ok(index as u32)
    }

    /// Deletes the unique type matching the descriptor.
    pub fn delete(&mut self, query: &TypeDesc) -> Result<(), RewriteError> {
        let index = exactly_one(self.positions(query))?;

        self.module.types.remove(index);
        fixer::shift_type_indices(self.module, index as u32, Shift::Delete);

        Ok(())
    }

    /// Overwrites the fields present in the item on every matching type.
    pub fn update(&mut self, query: &TypeDesc, item: &TypeDesc) -> Result<(), RewriteError> {
        for index in self.positions(query) {
            let kind = &mut self.module.types[index];

            if let Some(params) = &item.params {
                kind.params = params.clone();
            }
            if let Some(results) = &item.results {
                kind.results = results.clone();
            }
        }

        Ok(())
    }
}

/// Descriptor of a function import. The import index is the ordinal among
/// function imports, which is also the combined function index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportFuncDesc {
    pub import_index: Option<u32>,
    pub module: Option<String>,
    pub name: Option<String>,
    pub type_index: Option<u32>,
}

impl ImportFuncDesc {
    /// A descriptor matching the given function-import ordinal.
    pub fn at(import_index: u32) -> Self {
        ImportFuncDesc {
            import_index: Some(import_index),
            ..ImportFuncDesc::default()
        }
    }

    /// A descriptor matching the given two-level name.
    pub fn named(module: impl Into<String>, name: impl Into<String>) -> Self {
        ImportFuncDesc {
            module: Some(module.into()),
            name: Some(name.into()),
            ..ImportFuncDesc::default()
        }
    }
}

/// Query and mutation over the function imports of the import section.
pub struct ImportRewriter<'m> {
    module: &'m mut Module,
}

impl<'m> ImportRewriter<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        ImportRewriter { module }
    }

    /// Positions as `(section offset, function ordinal)` pairs.
    fn positions(&self, query: &ImportFuncDesc) -> Vec<(usize, u32)> {
        let mut rows = Vec::new();
        let mut ordinal = 0;

        for (offset, import) in self.module.imports.iter().enumerate() {
            if let ImportKind::Function(kind) = import.desc {
                if matches(&query.import_index, &ordinal)
                    && matches(&query.module, &import.module)
                    && matches(&query.name, &import.name)
                    && matches(&query.type_index, &kind)
                {
                    rows.push((offset, ordinal));
                }
                ordinal += 1;
            }
        }

        rows
    }

    /// Every function import matching the descriptor.
    pub fn select(&self, query: &ImportFuncDesc) -> Vec<ImportFuncDesc> {
        self.positions(query)
            .into_iter()
            .map(|(offset, ordinal)| {
                let import = &self.module.imports[offset];
                let kind = match import.desc {
                    ImportKind::Function(kind) => kind,
                    _ => unreachable!("positions only yields function imports"),
                };

                ImportFuncDesc {
                    import_index: Some(ordinal),
                    module: Some(import.module.clone()),
                    name: Some(import.name.clone()),
                    type_index: Some(kind),
                }
            })
            .collect()
    }

    /// Inserts a function import; appends when no query is given. Existing
    /// function references at or behind the new combined index shift up.
    /// Returns the combined function index of the import.
    pub fn insert(
        &mut self,
        query: Option<&ImportFuncDesc>,
        item: ImportFuncDesc,
    ) -> Result<u32, RewriteError> {
        let module_name = required(item.module, "module")?;
        let name = required(item.name, "name")?;
        let kind = required(item.type_index, "type_index")?;
        let import = Import::function(module_name, name, kind);

        let ordinal = match query {
            None => {
                let ordinal = self.module.imported_function_count();
                self.module.imports.push(import);
                ordinal
            }
            Some(query) => {
                let (offset, ordinal) = exactly_one(self.positions(query))?;
                self.module.imports.insert(offset, import);
                ordinal
            }
        };

        fixer::shift_function_indices(self.module, ordinal, Shift::Insert);

        Ok(ordinal)
    }

    /// Deletes the unique function import matching the descriptor. Fails if
    /// an instruction still calls it.
    pub fn delete(&mut self, query: &ImportFuncDesc) -> Result<(), RewriteError> {
        let (offset, ordinal) = exactly_one(self.positions(query))?;

        if fixer::function_is_referenced(self.module, ordinal) {
            return Err(RewriteError::DanglingReference {
                entity: "function",
                index: ordinal,
            });
        }

        self.module.imports.remove(offset);
        fixer::shift_function_indices(self.module, ordinal, Shift::Delete);

        Ok(())
    }

    /// Overwrites the fields present in the item on every matching import.
    pub fn update(
        &mut self,
        query: &ImportFuncDesc,
        item: &ImportFuncDesc,
    ) -> Result<(), RewriteError> {
        for (offset, _) in self.positions(query) {
            let import = &mut self.module.imports[offset];

            if let Some(module_name) = &item.module {
                import.module = module_name.clone();
            }
            if let Some(name) = &item.name {
                import.name = name.clone();
            }
            if let Some(kind) = item.type_index {
                import.desc = ImportKind::Function(kind);
            }
        }

        Ok(())
    }
}

/// Descriptor of an internal function: its combined index and type index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FunctionDesc {
    pub func_index: Option<u32>,
    pub type_index: Option<u32>,
}

impl FunctionDesc {
    /// A descriptor matching the given combined function index.
    pub fn at(func_index: u32) -> Self {
        FunctionDesc {
            func_index: Some(func_index),
            ..FunctionDesc::default()
        }
    }
}

/// Query and mutation over the function section.
pub struct FunctionRewriter<'m> {
    module: &'m mut Module,
}

impl<'m> FunctionRewriter<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        FunctionRewriter { module }
    }

    /// Positions as `(section offset, combined index)` pairs.
    fn positions(&self, query: &FunctionDesc) -> Vec<(usize, u32)> {
        let imports = self.module.imported_function_count();

        self.module
            .functions
            .iter()
            .enumerate()
            .filter(|(offset, kind)| {
                matches(&query.func_index, &(*offset as u32 + imports))
                    && matches(&query.type_index, kind)
            })
            .map(|(offset, _)| (offset, offset as u32 + imports))
            .collect()
    }

    /// Every internal function matching the descriptor.
    pub fn select(&self, query: &FunctionDesc) -> Vec<FunctionDesc> {
        self.positions(query)
            .into_iter()
            .map(|(offset, combined)| FunctionDesc {
                func_index: Some(combined),
                type_index: Some(self.module.functions[offset]),
            })
            .collect()
    }

    /// Inserts a function-section entry; appends when no query is given.
    /// Returns the combined index of the inserted function.
    pub fn insert(
        &mut self,
        query: Option<&FunctionDesc>,
        item: FunctionDesc,
    ) -> Result<u32, RewriteError> {
        let kind = required(item.type_index, "type_index")?;

        let combined = match query {
            None => {
                self.module.functions.push(kind);
                self.module.imported_function_count() + self.module.functions.len() as u32 - 1
            }
            Some(query) => {
                let (offset, combined) = exactly_one(self.positions(query))?;
                self.module.functions.insert(offset, kind);
                fixer::shift_function_indices(self.module, combined, Shift::Insert);
                combined
            }
        };

        Ok(combined)
    }

    /// Deletes the unique function-section entry matching the descriptor.
    /// Fails if an instruction still calls the function. The code entry is
    /// the caller's to remove through the code rewriter.
    pub fn delete(&mut self, query: &FunctionDesc) -> Result<(), RewriteError> {
        let (offset, combined) = exactly_one(self.positions(query))?;

        if fixer::function_is_referenced(self.module, combined) {
            return Err(RewriteError::DanglingReference {
                entity: "function",
                index: combined,
            });
        }

        self.module.functions.remove(offset);
        fixer::shift_function_indices(self.module, combined, Shift::Delete);

        Ok(())
    }

    /// Overwrites the type index on every matching entry.
    pub fn update(&mut self, query: &FunctionDesc, item: &FunctionDesc) -> Result<(), RewriteError> {
        for (offset, _) in self.positions(query) {
            if let Some(kind) = item.type_index {
                self.module.functions[offset] = kind;
            }
        }

        Ok(())
    }
}

/// Descriptor of a table: its limits.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableDesc {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

/// Query and mutation over the table section.
pub struct TableRewriter<'m> {
    module: &'m mut Module,
}

impl<'m> TableRewriter<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        TableRewriter { module }
    }

    fn positions(&self, query: &TableDesc) -> Vec<usize> {
        self.module
            .tables
            .iter()
            .enumerate()
            .filter(|(_, table)| {
                matches(&query.min, &table.limits.min)
                    && query
                        .max
                        .map_or(true, |expected| table.limits.max == Some(expected))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Every table matching the descriptor.
    pub fn select(&self, query: &TableDesc) -> Vec<TableDesc> {
        self.positions(query)
            .into_iter()
            .map(|index| {
                let limits = self.module.tables[index].limits;
                TableDesc {
                    min: Some(limits.min),
                    max: limits.max,
                }
            })
            .collect()
    }

    /// Appends a table.
    pub fn insert(&mut self, item: TableDesc) -> Result<(), RewriteError> {
        let min = required(item.min, "min")?;

        self.module
            .tables
            .push(TableType::new(Limits::new(min, item.max)));

        Ok(())
    }

    /// Overwrites the limits on every matching table.
    pub fn update(&mut self, query: &TableDesc, item: &TableDesc) -> Result<(), RewriteError> {
        for index in self.positions(query) {
            let limits = &mut self.module.tables[index].limits;

            if let Some(min) = item.min {
                limits.min = min;
            }
            if let Some(max) = item.max {
                limits.max = Some(max);
            }
        }

        Ok(())
    }
}

/// Descriptor of a memory: its limits in pages.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryDesc {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

/// Query and mutation over the memory section.
pub struct MemoryRewriter<'m> {
    module: &'m mut Module,
}

impl<'m> MemoryRewriter<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        MemoryRewriter { module }
    }

    fn positions(&self, query: &MemoryDesc) -> Vec<usize> {
        self.module
            .memories
            .iter()
            .enumerate()
            .filter(|(_, memory)| {
                matches(&query.min, &memory.min)
                    && query
                        .max
                        .map_or(true, |expected| memory.max == Some(expected))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Every memory matching the descriptor.
    pub fn select(&self, query: &MemoryDesc) -> Vec<MemoryDesc> {
        self.positions(query)
            .into_iter()
            .map(|index| {
                let memory = self.module.memories[index];
                MemoryDesc {
                    min: Some(memory.min),
                    max: memory.max,
                }
            })
            .collect()
    }

    /// Appends a memory.
    pub fn insert(&mut self, item: MemoryDesc) -> Result<(), RewriteError> {
        let min = required(item.min, "min")?;

        self.module.memories.push(Limits::new(min, item.max));

        Ok(())
    }

    /// Overwrites the limits on every matching memory.
    pub fn update(&mut self, query: &MemoryDesc, item: &MemoryDesc) -> Result<(), RewriteError> {
        for index in self.positions(query) {
            let memory = &mut self.module.memories[index];

            if let Some(min) = item.min {
                memory.min = min;
            }
            if let Some(max) = item.max {
                memory.max = Some(max);
            }
        }

        Ok(())
    }
}

/// Descriptor of a global variable, in the combined numbering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalDesc {
    pub global_index: Option<u32>,
    pub kind: Option<ValType>,
    pub mutability: Option<Mutability>,
    pub value: Option<ConstValue>,
}

impl GlobalDesc {
    /// A descriptor matching the given combined global index.
    pub fn at(global_index: u32) -> Self {
        GlobalDesc {
            global_index: Some(global_index),
            ..GlobalDesc::default()
        }
    }

    /// A descriptor carrying a value (and implicitly its type).
    pub fn valued(value: ConstValue) -> Self {
        GlobalDesc {
            kind: Some(value.kind()),
            value: Some(value),
            ..GlobalDesc::default()
        }
    }
}

/// Query and mutation over the global section.
pub struct GlobalRewriter<'m> {
    module: &'m mut Module,
}

impl<'m> GlobalRewriter<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        GlobalRewriter { module }
    }

    /// Positions as `(section offset, combined index)` pairs.
    fn positions(&self, query: &GlobalDesc) -> Vec<(usize, u32)> {
        let imports = self.module.imported_global_count();

        self.module
            .globals
            .iter()
            .enumerate()
            .filter(|(offset, global)| {
                let value = ConstValue::from_expression(&global.init);

                matches(&query.global_index, &(*offset as u32 + imports))
                    && matches(&query.kind, &global.kind.kind)
                    && matches(&query.mutability, &global.kind.mutability)
                    && query
                        .value
                        .map_or(true, |expected| value == Some(expected))
            })
            .map(|(offset, _)| (offset, offset as u32 + imports))
            .collect()
    }

    /// Every global matching the descriptor.
    pub fn select(&self, query: &GlobalDesc) -> Vec<GlobalDesc> {
        self.positions(query)
            .into_iter()
            .map(|(offset, combined)| {
                let global = &self.module.globals[offset];
                GlobalDesc {
                    global_index: Some(combined),
                    kind: Some(global.kind.kind),
                    mutability: Some(global.kind.mutability),
                    value: ConstValue::from_expression(&global.init),
                }
            })
            .collect()
    }

    /// Inserts a global; appends when no query is given. Returns the combined
    /// index of the inserted global.
    pub fn insert(
        &mut self,
        query: Option<&GlobalDesc>,
        item: GlobalDesc,
    ) -> Result<u32, RewriteError> {
        let value = required(item.value, "value")?;
        let kind = item.kind.unwrap_or_else(|| value.kind());
        let mutability = item.mutability.unwrap_or(Mutability::Immutable);
        let global = Global::new(GlobalType::new(kind, mutability), value.initializer());

        let combined = match query {
            None => {
                self.module.globals.push(global);
                self.module.global_count() - 1
            }
            Some(query) => {
                let (offset, combined) = exactly_one(self.positions(query))?;
                self.module.globals.insert(offset, global);
                fixer::shift_global_indices(self.module, combined, Shift::Insert);
                combined
            }
        };

        Ok(combined)
    }

    /// Deletes the unique global matching the descriptor. Fails if an
    /// instruction still references it.
    pub fn delete(&mut self, query: &GlobalDesc) -> Result<(), RewriteError> {
        let (offset, combined) = exactly_one(self.positions(query))?;

        if fixer::global_is_referenced(self.module, combined) {
            return Err(RewriteError::DanglingReference {
                entity: "global",
                index: combined,
            });
        }

        self.module.globals.remove(offset);
        fixer::shift_global_indices(self.module, combined, Shift::Delete);

        Ok(())
    }

    /// Overwrites the fields present in the item on every matching global.
    pub fn update(&mut self, query: &GlobalDesc, item: &GlobalDesc) -> Result<(), RewriteError> {
        for (offset, _) in self.positions(query) {
            let global = &mut self.module.globals[offset];

            if let Some(kind) = item.kind {
                global.kind.kind = kind;
            }
            if let Some(mutability) = item.mutability {
                global.kind.mutability = mutability;
            }
            if let Some(value) = item.value {
                global.kind.kind = value.kind();
                global.init = value.initializer();
            }
        }

        Ok(())
    }
}

/// Descriptor of a function export.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportFuncDesc {
    pub export_index: Option<u32>,
    pub name: Option<String>,
    pub func_index: Option<u32>,
}

impl ExportFuncDesc {
    /// A descriptor matching the given export name.
    pub fn named(name: impl Into<String>) -> Self {
        ExportFuncDesc {
            name: Some(name.into()),
            ..ExportFuncDesc::default()
        }
    }
}

/// Query and mutation over the function exports of the export section.
pub struct ExportRewriter<'m> {
    module: &'m mut Module,
}

impl<'m> ExportRewriter<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        ExportRewriter { module }
    }

    fn positions(&self, query: &ExportFuncDesc) -> Vec<usize> {
        self.module
            .exports
            .iter()
            .enumerate()
            .filter(|(index, export)| match export.desc {
                ExportKind::Function(function) => {
                    matches(&query.export_index, &(*index as u32))
                        && matches(&query.name, &export.name)
                        && matches(&query.func_index, &function)
                }
                _ => false,
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Every function export matching the descriptor.
    pub fn select(&self, query: &ExportFuncDesc) -> Vec<ExportFuncDesc> {
        self.positions(query)
            .into_iter()
            .map(|index| {
                let export = &self.module.exports[index];
                let function = match export.desc {
                    ExportKind::Function(function) => function,
                    _ => unreachable!("positions only yields function exports"),
                };

                ExportFuncDesc {
                    export_index: Some(index as u32),
                    name: Some(export.name.clone()),
                    func_index: Some(function),
                }
            })
            .collect()
    }

    /// Inserts a function export; appends when no query is given.
    pub fn insert(
        &mut self,
        query: Option<&ExportFuncDesc>,
        item: ExportFuncDesc,
    ) -> Result<(), RewriteError> {
        let name = required(item.name, "name")?;
        let function = required(item.func_index, "func_index")?;
        let export = Export::function(name, function);

        match query {
            None => self.module.exports.push(export),
            Some(query) => {
                let index = exactly_one(self.positions(query))?;
                self.module.exports.insert(index, export);
            }
        }

        Ok(())
    }

    /// Deletes the unique function export matching the descriptor.
    pub fn delete(&mut self, query: &ExportFuncDesc) -> Result<(), RewriteError> {
        let index = exactly_one(self.positions(query))?;
        self.module.exports.remove(index);

        Ok(())
    }

    /// Overwrites the fields present in the item on every matching export.
    pub fn update(
        &mut self,
        query: &ExportFuncDesc,
        item: &ExportFuncDesc,
    ) -> Result<(), RewriteError> {
        for index in self.positions(query) {
            let export = &mut self.module.exports[index];

            if let Some(name) = &item.name {
                export.name = name.clone();
            }
            if let Some(function) = item.func_index {
                export.desc = ExportKind::Function(function);
            }
        }

        Ok(())
    }
}

/// Descriptor of an element segment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementDesc {
    pub elem_index: Option<u32>,
    pub table_index: Option<u32>,
    pub offset: Option<u32>,
    pub functions: Option<Vec<u32>>,
}

/// Query and mutation over the element section.
pub struct ElementRewriter<'m> {
    module: &'m mut Module,
}

impl<'m> ElementRewriter<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        ElementRewriter { module }
    }

    fn positions(&self, query: &ElementDesc) -> Vec<usize> {
        self.module
            .elements
            .iter()
            .enumerate()
            .filter(|(index, element)| {
                let offset = element_offset(element);

                matches(&query.elem_index, &(*index as u32))
                    && matches(&query.table_index, &element.table)
                    && query.offset.map_or(true, |expected| offset == Some(expected))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Every element segment matching the descriptor.
    pub fn select(&self, query: &ElementDesc) -> Vec<ElementDesc> {
        self.positions(query)
            .into_iter()
            .map(|index| {
                let element = &self.module.elements[index];
                ElementDesc {
                    elem_index: Some(index as u32),
                    table_index: Some(element.table),
                    offset: element_offset(element),
                    functions: Some(element.functions.clone()),
                }
            })
            .collect()
    }

    /// Inserts an element segment; appends when no query is given. Table
    /// limits widen to cover the segment.
    pub fn insert(
        &mut self,
        query: Option<&ElementDesc>,
        item: ElementDesc,
    ) -> Result<(), RewriteError> {
        let offset = required(item.offset, "offset")?;
        let functions = required(item.functions, "functions")?;
        let element = Element::new(
            item.table_index.unwrap_or(0),
            ConstValue::I32(offset as i32).initializer(),
            functions,
        );

        match query {
            None => self.module.elements.push(element),
            Some(query) => {
                let index = exactly_one(self.positions(query))?;
                self.module.elements.insert(index, element);
            }
        }

        self.widen_table();

        Ok(())
    }

    /// Deletes the unique element segment matching the descriptor.
    pub fn delete(&mut self, query: &ElementDesc) -> Result<(), RewriteError> {
        let index = exactly_one(self.positions(query))?;
        self.module.elements.remove(index);

        Ok(())
    }

    /// Overwrites the fields present in the item on every matching segment.
    /// Table limits widen to cover the result.
    pub fn update(&mut self, query: &ElementDesc, item: &ElementDesc) -> Result<(), RewriteError> {
        for index in self.positions(query) {
            let element = &mut self.module.elements[index];

            if let Some(table) = item.table_index {
                element.table = table;
            }
            if let Some(offset) = item.offset {
                element.offset = ConstValue::I32(offset as i32).initializer();
            }
            if let Some(functions) = &item.functions {
                element.functions = functions.clone();
            }
        }

        self.widen_table();

        Ok(())
    }

    /// Widens table 0 to the furthest entry any segment initializes.
    fn widen_table(&mut self) {
        let needed = self
            .module
            .elements
            .iter()
            .map(|element| {
                element_offset(element).unwrap_or(0) + element.functions.len() as u32
            })
            .max()
            .unwrap_or(0);

        if needed > 0 {
            fixer::widen_table_limits(self.module, needed);
        }
    }
}

/// The constant offset of an element segment, when it is a plain `i32.const`.
fn element_offset(element: &Element) -> Option<u32> {
    match ConstValue::from_expression(&element.offset) {
        Some(ConstValue::I32(offset)) => Some(offset as u32),
        _ => None,
    }
}

/// Descriptor of a function body, in the combined numbering. The body is in
/// the flat instruction form and the locals are expanded one value type per
/// local.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CodeDesc {
    pub func_index: Option<u32>,
    pub locals: Option<Vec<ValType>>,
    pub body: Option<Vec<Instruction>>,
}

impl CodeDesc {
    /// A descriptor matching the given combined function index.
    pub fn at(func_index: u32) -> Self {
        CodeDesc {
            func_index: Some(func_index),
            ..CodeDesc::default()
        }
    }
}

/// Query and mutation over the code section. Bodies are exposed in the flat
/// form and folded back on the way in.
pub struct CodeRewriter<'m> {
    module: &'m mut Module,
}

impl<'m> CodeRewriter<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        CodeRewriter { module }
    }

    /// Rejects descriptors that target the imported function range.
    fn check_editable(&self, query: &CodeDesc) -> Result<(), RewriteError> {
        let imports = self.module.imported_function_count();

        if let Some(index) = query.func_index {
            if index < imports {
                return Err(RewriteError::ImportNotEditable(index));
            }
        }

        Ok(())
    }

    /// Positions as `(section offset, combined index)` pairs.
    fn positions(&self, query: &CodeDesc) -> Vec<(usize, u32)> {
        let imports = self.module.imported_function_count();

        self.module
            .code
            .iter()
            .enumerate()
            .filter(|(offset, _)| matches(&query.func_index, &(*offset as u32 + imports)))
            .map(|(offset, _)| (offset, offset as u32 + imports))
            .collect()
    }

    /// Every body matching the descriptor, flattened.
    pub fn select(&self, query: &CodeDesc) -> Result<Vec<CodeDesc>, RewriteError> {
        self.check_editable(query)?;

        Ok(self
            .positions(query)
            .into_iter()
            .map(|(offset, combined)| {
                let code = &self.module.code[offset];
                CodeDesc {
                    func_index: Some(combined),
                    locals: Some(expand_locals(&code.locals)),
                    body: Some(code.body.flatten()),
                }
            })
            .collect())
    }

    /// Inserts a code entry; appends when no query is given. The function
    /// section is the caller's to keep in step.
    pub fn insert(&mut self, query: Option<&CodeDesc>, item: CodeDesc) -> Result<(), RewriteError> {
        let locals = compress_locals(&item.locals.unwrap_or_default());
        let body = fold_instructions(&required(item.body, "body")?)?;
        let code = Code::new(locals, body);

        match query {
            None => self.module.code.push(code),
            Some(query) => {
                self.check_editable(query)?;
                let (offset, _) = exactly_one(self.positions(query))?;
                self.module.code.insert(offset, code);
            }
        }

        Ok(())
    }

    /// Deletes the unique code entry matching the descriptor.
    pub fn delete(&mut self, query: &CodeDesc) -> Result<(), RewriteError> {
        self.check_editable(query)?;
        let (offset, _) = exactly_one(self.positions(query))?;
        self.module.code.remove(offset);

        Ok(())
    }

    /// Overwrites the fields present in the item on every matching body.
    pub fn update(&mut self, query: &CodeDesc, item: &CodeDesc) -> Result<(), RewriteError> {
        self.check_editable(query)?;

        for (offset, _) in self.positions(query) {
            if let Some(locals) = &item.locals {
                self.module.code[offset].locals = compress_locals(locals);
            }
            if let Some(body) = &item.body {
                self.module.code[offset].body = fold_instructions(body)?;
            }
        }

        Ok(())
    }
}

/// Expands run-length local groups into one value type per local.
fn expand_locals(locals: &[Locals]) -> Vec<ValType> {
    let mut kinds = Vec::new();

    for group in locals {
        kinds.extend(std::iter::repeat(group.kind).take(group.count as usize));
    }

    kinds
}

/// Compresses per-local value types into run-length groups.
fn compress_locals(kinds: &[ValType]) -> Vec<Locals> {
    let mut groups: Vec<Locals> = Vec::new();

    for kind in kinds {
        match groups.last_mut() {
            Some(group) if group.kind == *kind => group.count += 1,
            _ => groups.push(Locals::new(1, *kind)),
        }
    }

    groups
}

/// Descriptor of a data segment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataDesc {
    pub data_index: Option<u32>,
    pub offset: Option<u32>,
    pub init: Option<Vec<u8>>,
}

/// Query and mutation over the data section.
pub struct DataRewriter<'m> {
    module: &'m mut Module,
}

impl<'m> DataRewriter<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        DataRewriter { module }
    }

    fn positions(&self, query: &DataDesc) -> Vec<usize> {
        self.module
            .data
            .iter()
            .enumerate()
            .filter(|(index, data)| {
                matches(&query.data_index, &(*index as u32))
                    && query
                        .offset
                        .map_or(true, |expected| data_offset(data) == Some(expected))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Every data segment matching the descriptor.
    pub fn select(&self, query: &DataDesc) -> Vec<DataDesc> {
        self.positions(query)
            .into_iter()
            .map(|index| {
                let data = &self.module.data[index];
                DataDesc {
                    data_index: Some(index as u32),
                    offset: data_offset(data),
                    init: Some(data.init.clone()),
                }
            })
            .collect()
    }

    /// Inserts an active data segment; appends when no query is given.
    pub fn insert(&mut self, query: Option<&DataDesc>, item: DataDesc) -> Result<(), RewriteError> {
        let offset = required(item.offset, "offset")?;
        let init = required(item.init, "init")?;
        let data = Data::active(0, ConstValue::I32(offset as i32).initializer(), init);

        match query {
            None => self.module.data.push(data),
            Some(query) => {
                let index = exactly_one(self.positions(query))?;
                self.module.data.insert(index, data);
                fixer::shift_data_indices(self.module, index as u32, Shift::Insert);
            }
        }

        self.sync_data_count();

        Ok(())
    }

    /// Deletes the unique data segment matching the descriptor.
    pub fn delete(&mut self, query: &DataDesc) -> Result<(), RewriteError> {
        let index = exactly_one(self.positions(query))?;

        self.module.data.remove(index);
        fixer::shift_data_indices(self.module, index as u32, Shift::Delete);
        self.sync_data_count();

        Ok(())
    }

    /// Overwrites the fields present in the item on every matching segment.
    pub fn update(&mut self, query: &DataDesc, item: &DataDesc) -> Result<(), RewriteError> {
        for index in self.positions(query) {
            let data = &mut self.module.data[index];

            if let Some(offset) = item.offset {
                data.mode = DataMode::Active(0, ConstValue::I32(offset as i32).initializer());
            }
            if let Some(init) = &item.init {
                data.init = init.clone();
            }
        }

        Ok(())
    }

    /// Keeps the data-count section in step with the data section.
    fn sync_data_count(&mut self) {
        if self.module.data_count.is_some() {
            self.module.data_count = Some(self.module.data.len() as u32);
        }
    }
}

/// The constant offset of an active data segment.
fn data_offset(data: &Data) -> Option<u32> {
    match &data.mode {
        DataMode::Active(_, offset) => match ConstValue::from_expression(offset) {
            Some(ConstValue::I32(offset)) => Some(offset as u32),
            _ => None,
        },
        DataMode::Passive => None,
    }
}

/// The index space a name descriptor addresses.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NameKind {
    Function,
    Global,
    Data,
}

/// Descriptor of one name-map entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NameDesc {
    pub index: Option<u32>,
    pub name: Option<String>,
}

impl NameDesc {
    /// A descriptor matching the given index.
    pub fn at(index: u32) -> Self {
        NameDesc {
            index: Some(index),
            ..NameDesc::default()
        }
    }
}

/// Query and mutation over one name map of the `name` custom section.
pub struct NameRewriter<'m> {
    module: &'m mut Module,
    kind: NameKind,
}

impl<'m> NameRewriter<'m> {
    pub fn new(module: &'m mut Module, kind: NameKind) -> Self {
        NameRewriter { module, kind }
    }

    fn map(&self) -> &[NameAssoc] {
        match self.module.name_section() {
            Some(names) => match self.kind {
                NameKind::Function => &names.functions,
                NameKind::Global => &names.globals,
                NameKind::Data => &names.data,
            },
            None => &[],
        }
    }

    fn map_mut(&mut self) -> &mut Vec<NameAssoc> {
        let names = self.module.name_section_mut_or_insert();

        match self.kind {
            NameKind::Function => &mut names.functions,
            NameKind::Global => &mut names.globals,
            NameKind::Data => &mut names.data,
        }
    }

    fn positions(&self, query: &NameDesc) -> Vec<usize> {
        self.map()
            .iter()
            .enumerate()
            .filter(|(_, assoc)| {
                matches(&query.index, &assoc.index) && matches(&query.name, &assoc.name)
            })
            .map(|(position, _)| position)
            .collect()
    }

    /// Every name-map entry matching the descriptor.
    pub fn select(&self, query: &NameDesc) -> Vec<NameDesc> {
        self.positions(query)
            .into_iter()
            .map(|position| {
                let assoc = &self.map()[position];
                NameDesc {
                    index: Some(assoc.index),
                    name: Some(assoc.name.clone()),
                }
            })
            .collect()
    }

    /// Inserts a name-map entry; appends when no query is given.
    pub fn insert(&mut self, query: Option<&NameDesc>, item: NameDesc) -> Result<(), RewriteError> {
        let index = required(item.index, "index")?;
        let name = required(item.name, "name")?;
        let assoc = NameAssoc::new(index, name);

        match query {
            None => self.map_mut().push(assoc),
            Some(query) => {
                let position = exactly_one(self.positions(query))?;
                self.map_mut().insert(position, assoc);
            }
        }

        Ok(())
    }

    /// Deletes the unique name-map entry matching the descriptor.
    pub fn delete(&mut self, query: &NameDesc) -> Result<(), RewriteError> {
        let position = exactly_one(self.positions(query))?;
        self.map_mut().remove(position);

        Ok(())
    }

    /// Overwrites the name on every matching entry.
    pub fn update(&mut self, query: &NameDesc, item: &NameDesc) -> Result<(), RewriteError> {
        for position in self.positions(query) {
            if let Some(name) = &item.name {
                self.map_mut()[position].name = name.clone();
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn fixture() -> Module {
        let mut module = Module::empty();
        module.types.push(FuncType::runnable());
        module.types.push(FuncType::new(vec![ValType::I32], vec![]));
        module.functions.push(0);
        module.functions.push(1);
        module.code.push(Code::new(
            Vec::new(),
            Expression::new(vec![Instruction::call(0)]),
        ));
        module.code.push(Code::new(
            Vec::new(),
            Expression::new(vec![Instruction::call(1)]),
        ));
        module
    }

    #[test]
    fn select_types_by_signature() {
        let mut module = fixture();
        let rewriter = TypeRewriter::new(&mut module);

        let rows = rewriter.select(&TypeDesc::signature(vec![ValType::I32], vec![]));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].type_index, Some(1));
    }

    #[test]
    fn insert_type_shifts_function_kinds() {
        let mut module = fixture();
        let mut rewriter = TypeRewriter::new(&mut module);

        let index = rewriter
            .insert(
                Some(&TypeDesc::at(1)),
                TypeDesc::signature(vec![], vec![ValType::I64]),
            )
            .unwrap();

        assert_eq!(index, 1);
        assert_eq!(module.types.len(), 3);
        // The function that used type 1 now uses type 2.
        assert_eq!(module.functions, vec![0, 2]);
    }

    #[test]
    fn insert_with_ambiguous_selector_fails() {
        let mut module = fixture();
        let mut rewriter = FunctionRewriter::new(&mut module);

        let result = rewriter.insert(Some(&FunctionDesc::default()), FunctionDesc {
            func_index: None,
            type_index: Some(0),
        });

        assert!(matches!(result, Err(RewriteError::AmbiguousSelector(2))));
    }

    #[test]
    fn insert_import_shifts_calls() {
        let mut module = fixture();
        let mut rewriter = ImportRewriter::new(&mut module);

        let index = rewriter
            .insert(
                None,
                ImportFuncDesc {
                    import_index: None,
                    module: Some("env".to_string()),
                    name: Some("log".to_string()),
                    type_index: Some(0),
                },
            )
            .unwrap();

        // The import lands at combined index 0; both self-calls shift.
        assert_eq!(index, 0);
        assert_eq!(
            module.code[0].body.instructions(),
            &[Instruction::call(1)]
        );
        assert_eq!(
            module.code[1].body.instructions(),
            &[Instruction::call(2)]
        );
    }

    #[test]
    fn delete_referenced_import_fails() {
        let mut module = fixture();
        ImportRewriter::new(&mut module)
            .insert(None, ImportFuncDesc {
                import_index: None,
                module: Some("env".to_string()),
                name: Some("log".to_string()),
                type_index: Some(0),
            })
            .unwrap();
        module.code[0].body = Expression::new(vec![Instruction::call(0)]);

        let result = ImportRewriter::new(&mut module).delete(&ImportFuncDesc::at(0));

        assert!(matches!(
            result,
            Err(RewriteError::DanglingReference {
                entity: "function",
                index: 0
            })
        ));
    }

    #[test]
    fn delete_unreferenced_import_shifts_back() {
        let mut module = fixture();
        ImportRewriter::new(&mut module)
            .insert(None, ImportFuncDesc {
                import_index: None,
                module: Some("env".to_string()),
                name: Some("log".to_string()),
                type_index: Some(0),
            })
            .unwrap();

        ImportRewriter::new(&mut module)
            .delete(&ImportFuncDesc::at(0))
            .unwrap();

        assert_eq!(
            module.code[0].body.instructions(),
            &[Instruction::call(0)]
        );
        assert_eq!(module.imported_function_count(), 0);
    }

    #[test]
    fn global_descriptors_use_combined_numbering() {
        let mut module = Module::empty();
        module.imports.push(Import::new(
            "env",
            "flag",
            ImportKind::Global(GlobalType::immutable(ValType::I32)),
        ));
        module.globals.push(Global::new(
            GlobalType::mutable(ValType::I64),
            ConstValue::I64(5).initializer(),
        ));

        let mut rewriter = GlobalRewriter::new(&mut module);
        let rows = rewriter.select(&GlobalDesc::default());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].global_index, Some(1));
        assert_eq!(rows[0].value, Some(ConstValue::I64(5)));

        let index = rewriter
            .insert(None, GlobalDesc::valued(ConstValue::I32(0)))
            .unwrap();
        assert_eq!(index, 2);
    }

    #[test]
    fn delete_referenced_global_fails() {
        let mut module = fixture();
        module.globals.push(Global::new(
            GlobalType::mutable(ValType::I32),
            ConstValue::I32(0).initializer(),
        ));
        module.code[0].body = Expression::new(vec![Instruction::global_get(0)]);

        let result = GlobalRewriter::new(&mut module).delete(&GlobalDesc::at(0));

        assert!(matches!(
            result,
            Err(RewriteError::DanglingReference {
                entity: "global",
                index: 0
            })
        ));
    }

    #[test]
    fn code_rewriter_rejects_imported_range() {
        let mut module = fixture();
        module.imports.push(Import::function("env", "log", 0));

        let result = CodeRewriter::new(&mut module).select(&CodeDesc::at(0));

        assert!(matches!(result, Err(RewriteError::ImportNotEditable(0))));
    }

    #[test]
    fn code_select_flattens_bodies() {
        let mut module = Module::empty();
        module.types.push(FuncType::runnable());
        module.functions.push(0);
        module.code.push(Code::new(
            vec![Locals::new(2, ValType::I32)],
            Expression::new(vec![Instruction::new(
                opcode::BLOCK,
                Args::Block(BlockArgs {
                    kind: crate::model::BlockType::Empty,
                    body: Expression::new(vec![Instruction::plain(opcode::NOP)]),
                }),
            )]),
        ));

        let rows = CodeRewriter::new(&mut module).select(&CodeDesc::at(0)).unwrap();

        assert_eq!(rows[0].locals, Some(vec![ValType::I32, ValType::I32]));
        let opcodes: Vec<u32> = rows[0]
            .body
            .as_ref()
            .unwrap()
            .iter()
            .map(|i| i.opcode)
            .collect();
        assert_eq!(opcodes, vec![opcode::BLOCK, opcode::NOP, opcode::END]);
    }

    #[test]
    fn code_update_folds_bodies() {
        let mut module = Module::empty();
        module.types.push(FuncType::runnable());
        module.functions.push(0);
        module.code.push(Code::default());

        let flat = vec![
            Instruction::new(
                opcode::BLOCK,
                Args::Block(BlockArgs {
                    kind: crate::model::BlockType::Empty,
                    body: Expression::empty(),
                }),
            ),
            Instruction::plain(opcode::NOP),
            Instruction::end(),
        ];

        CodeRewriter::new(&mut module)
            .update(&CodeDesc::at(0), &CodeDesc {
                func_index: None,
                locals: None,
                body: Some(flat),
            })
            .unwrap();

        let body = module.code[0].body.instructions();
        assert_eq!(body.len(), 1);
        assert!(matches!(body[0].args, Args::Block(_)));
    }

    #[test]
    fn data_rewriter_round_trips_segments() {
        let mut module = Module::empty();
        module.data_count = Some(0);

        DataRewriter::new(&mut module)
            .insert(None, DataDesc {
                data_index: None,
                offset: Some(100),
                init: Some(vec![1, 2, 3]),
            })
            .unwrap();

        assert_eq!(module.data_count, Some(1));

        let rows = DataRewriter::new(&mut module).select(&DataDesc::default());
        assert_eq!(rows[0].offset, Some(100));
        assert_eq!(rows[0].init, Some(vec![1, 2, 3]));

        DataRewriter::new(&mut module)
            .delete(&DataDesc {
                data_index: None,
                offset: Some(100),
                init: None,
            })
            .unwrap();
        assert_eq!(module.data_count, Some(0));
        assert!(module.data.is_empty());
    }

    #[test]
    fn name_rewriter_updates_entries() {
        let mut module = Module::empty();
        let mut rewriter = NameRewriter::new(&mut module, NameKind::Function);

        rewriter
            .insert(None, NameDesc {
                index: Some(0),
                name: Some("main".to_string()),
            })
            .unwrap();
        rewriter
            .update(&NameDesc::at(0), &NameDesc {
                index: None,
                name: Some("entry".to_string()),
            })
            .unwrap();

        assert_eq!(module.name_section().unwrap().function_name(0), Some("entry"));
    }

    #[test]
    fn element_rewriter_widens_table() {
        let mut module = Module::empty();

        ElementRewriter::new(&mut module)
            .insert(None, ElementDesc {
                elem_index: None,
                table_index: None,
                offset: Some(1),
                functions: Some(vec![0, 1, 2]),
            })
            .unwrap();

        assert_eq!(module.tables[0].limits, Limits::bounded(4, 4));
    }

    #[test]
    fn fold_rejects_malformed_sequences() {
        assert!(matches!(
            fold_instructions(&[Instruction::end()]),
            Err(RewriteError::UnmatchedEnd)
        ));
        assert!(matches!(
            fold_instructions(&[Instruction::else_marker()]),
            Err(RewriteError::UnexpectedElse)
        ));
        assert!(matches!(
            fold_instructions(&[Instruction::new(
                opcode::BLOCK,
                Args::Block(BlockArgs {
                    kind: crate::model::BlockType::Empty,
                    body: Expression::empty(),
                })
            )]),
            Err(RewriteError::MissingEnd)
        ));
    }

    #[test]
    fn flatten_fold_round_trip() {
        let body = Expression::new(vec![
            Instruction::i32_const(1),
            Instruction::new(
                opcode::IF,
                Args::If(IfArgs {
                    kind: crate::model::BlockType::Empty,
                    then: Expression::new(vec![Instruction::new(
                        opcode::LOOP,
                        Args::Block(BlockArgs {
                            kind: crate::model::BlockType::Empty,
                            body: Expression::new(vec![Instruction::plain(opcode::NOP)]),
                        }),
                    )]),
                    otherwise: Some(Expression::new(vec![Instruction::call(2)])),
                }),
            ),
        ]);

        assert_eq!(fold_instructions(&body.flatten()).unwrap(), body);
    }

    #[quickcheck]
    fn flatten_fold_identity_on_generated_bodies(seed: u64) -> bool {
        let body = arbitrary_body(seed, 3);
        fold_instructions(&body.flatten()).unwrap() == body
    }

    /// Deterministic pseudo-random nested body from a seed.
    fn arbitrary_body(mut seed: u64, depth: u32) -> Expression {
        let mut instructions = Vec::new();
        let length = (seed % 4) as usize + 1;

        for _ in 0..length {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);

            let instruction = match seed % 5 {
                0 => Instruction::plain(opcode::NOP),
                1 => Instruction::i32_const((seed >> 8) as i32),
                2 => Instruction::call((seed >> 8) as u32 % 16),
                3 if depth > 0 => Instruction::new(
                    opcode::BLOCK,
                    Args::Block(BlockArgs {
                        kind: crate::model::BlockType::Empty,
                        body: arbitrary_body(seed >> 3, depth - 1),
                    }),
                ),
                4 if depth > 0 => Instruction::new(
                    opcode::IF,
                    Args::If(IfArgs {
                        kind: crate::model::BlockType::Empty,
                        then: arbitrary_body(seed >> 4, depth - 1),
                        otherwise: if seed % 2 == 0 {
                            Some(arbitrary_body(seed >> 5, depth - 1))
                        } else {
                            None
                        },
                    }),
                ),
                _ => Instruction::plain(opcode::DROP),
            };

            instructions.push(instruction);
        }

        Expression::new(instructions)
    }
}
