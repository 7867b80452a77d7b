//! Named high-level operations composed from the section rewriters.
//!
//! Each operation maps onto one or a few section-rewriter calls; the index
//! fixer runs inside those calls, so a semantics operation leaves the module
//! consistent as a whole.

use crate::model::{Args, DataMode, Instruction, Module, ValType};
use crate::opcode;
use crate::rewriter::errors::RewriteError;
use crate::rewriter::fixer;
use crate::rewriter::section::{
    CodeDesc, CodeRewriter, ConstValue, DataDesc, DataRewriter, ElementDesc, ElementRewriter,
    ExportFuncDesc, ExportRewriter, FunctionDesc, FunctionRewriter, GlobalDesc, GlobalRewriter,
    ImportFuncDesc, ImportRewriter, NameDesc, NameKind, NameRewriter, TypeDesc, TypeRewriter,
};

/// High-level rewriting operations over one module.
pub struct SemanticsRewriter<'m> {
    module: &'m mut Module,
}

impl<'m> SemanticsRewriter<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        SemanticsRewriter { module }
    }

    /// The index of a function type with the given signature, appending one
    /// when the module has none.
    fn ensure_type(
        &mut self,
        params: Vec<ValType>,
        results: Vec<ValType>,
    ) -> Result<u32, RewriteError> {
        let mut types = TypeRewriter::new(self.module);
        let query = TypeDesc::signature(params.clone(), results.clone());

        match types.select(&query).first() {
            Some(row) => Ok(row.type_index.unwrap_or_default()),
            None => types.insert(None, TypeDesc::signature(params, results)),
        }
    }

    /// Inserts a global at the given combined index. An index one past the
    /// last global appends. Returns the index.
    pub fn insert_global_variable(
        &mut self,
        index: u32,
        value: ConstValue,
    ) -> Result<u32, RewriteError> {
        let appending = index == self.module.global_count();
        let mut globals = GlobalRewriter::new(self.module);

        if appending {
            globals.insert(None, GlobalDesc::valued(value))
        } else {
            globals.insert(Some(&GlobalDesc::at(index)), GlobalDesc::valued(value))
        }
    }

    /// Appends a global. Returns its combined index.
    pub fn append_global_variable(&mut self, value: ConstValue) -> Result<u32, RewriteError> {
        GlobalRewriter::new(self.module).insert(None, GlobalDesc::valued(value))
    }

    /// Replaces the value (and with it the type) of the global at the given
    /// combined index.
    pub fn modify_global_variable(
        &mut self,
        index: u32,
        value: ConstValue,
    ) -> Result<(), RewriteError> {
        GlobalRewriter::new(self.module).update(&GlobalDesc::at(index), &GlobalDesc::valued(value))
    }

    /// Deletes the global at the given combined index.
    pub fn delete_global_variable(&mut self, index: u32) -> Result<(), RewriteError> {
        GlobalRewriter::new(self.module).delete(&GlobalDesc::at(index))
    }

    /// Inserts a function import before the given function-import ordinal,
    /// reusing or appending the function type. An ordinal one past the last
    /// function import appends. Returns the combined function index of the
    /// import.
    pub fn insert_import_function(
        &mut self,
        index: u32,
        module_name: &str,
        name: &str,
        params: Vec<ValType>,
        results: Vec<ValType>,
    ) -> Result<u32, RewriteError> {
        let kind = self.ensure_type(params, results)?;
        let appending = index == self.module.imported_function_count();

        let item = ImportFuncDesc {
            import_index: None,
            module: Some(module_name.to_string()),
            name: Some(name.to_string()),
            type_index: Some(kind),
        };
        let mut imports = ImportRewriter::new(self.module);

        if appending {
            imports.insert(None, item)
        } else {
            imports.insert(Some(&ImportFuncDesc::at(index)), item)
        }
    }

    /// Appends a function import. Returns its combined function index.
    pub fn append_import_function(
        &mut self,
        module_name: &str,
        name: &str,
        params: Vec<ValType>,
        results: Vec<ValType>,
    ) -> Result<u32, RewriteError> {
        let kind = self.ensure_type(params, results)?;

        ImportRewriter::new(self.module).insert(
            None,
            ImportFuncDesc {
                import_index: None,
                module: Some(module_name.to_string()),
                name: Some(name.to_string()),
                type_index: Some(kind),
            },
        )
    }

    /// Repoints the function import at the given ordinal.
    pub fn modify_import_function(
        &mut self,
        index: u32,
        module_name: &str,
        name: &str,
        params: Vec<ValType>,
        results: Vec<ValType>,
    ) -> Result<(), RewriteError> {
        let kind = self.ensure_type(params, results)?;

        ImportRewriter::new(self.module).update(
            &ImportFuncDesc::at(index),
            &ImportFuncDesc {
                import_index: None,
                module: Some(module_name.to_string()),
                name: Some(name.to_string()),
                type_index: Some(kind),
            },
        )
    }

    /// Deletes the function import at the given ordinal.
    pub fn delete_import_function(&mut self, index: u32) -> Result<(), RewriteError> {
        ImportRewriter::new(self.module).delete(&ImportFuncDesc::at(index))
    }

    /// Inserts a function export before the given export position. A
    /// position one past the last export appends.
    pub fn insert_export_function(
        &mut self,
        index: u32,
        name: &str,
        function: u32,
    ) -> Result<(), RewriteError> {
        let appending = index as usize == self.module.exports.len();
        let item = ExportFuncDesc {
            export_index: None,
            name: Some(name.to_string()),
            func_index: Some(function),
        };
        let mut exports = ExportRewriter::new(self.module);

        if appending {
            exports.insert(None, item)
        } else {
            exports.insert(
                Some(&ExportFuncDesc {
                    export_index: Some(index),
                    ..ExportFuncDesc::default()
                }),
                item,
            )
        }
    }

    /// Appends a function export.
    pub fn append_export_function(&mut self, name: &str, function: u32) -> Result<(), RewriteError> {
        ExportRewriter::new(self.module).insert(
            None,
            ExportFuncDesc {
                export_index: None,
                name: Some(name.to_string()),
                func_index: Some(function),
            },
        )
    }

    /// Renames or repoints the function export at the given position.
    pub fn modify_export_function(
        &mut self,
        index: u32,
        name: &str,
        function: u32,
    ) -> Result<(), RewriteError> {
        ExportRewriter::new(self.module).update(
            &ExportFuncDesc {
                export_index: Some(index),
                ..ExportFuncDesc::default()
            },
            &ExportFuncDesc {
                export_index: None,
                name: Some(name.to_string()),
                func_index: Some(function),
            },
        )
    }

    /// Deletes the function export with the given name.
    pub fn delete_export_function(&mut self, name: &str) -> Result<(), RewriteError> {
        ExportRewriter::new(self.module).delete(&ExportFuncDesc::named(name))
    }

    /// Inserts an internal function at the given combined index; the body is
    /// in the flat form. Returns the combined index.
    pub fn insert_internal_function(
        &mut self,
        index: u32,
        params: Vec<ValType>,
        results: Vec<ValType>,
        locals: Vec<ValType>,
        body: Vec<Instruction>,
    ) -> Result<u32, RewriteError> {
        let imports = self.module.imported_function_count();

        if index < imports {
            return Err(RewriteError::ImportNotEditable(index));
        }

        let kind = self.ensure_type(params, results)?;
        let appending = index == self.module.function_count();

        let item = FunctionDesc {
            func_index: None,
            type_index: Some(kind),
        };
        let code = CodeDesc {
            func_index: None,
            locals: Some(locals),
            body: Some(body),
        };

        if appending {
            FunctionRewriter::new(self.module).insert(None, item)?;
            CodeRewriter::new(self.module).insert(None, code)?;
        } else {
            FunctionRewriter::new(self.module).insert(Some(&FunctionDesc::at(index)), item)?;
            CodeRewriter::new(self.module).insert(Some(&CodeDesc::at(index)), code)?;
        }

        Ok(index)
    }

    /// Appends an internal function. Returns its combined index.
    pub fn append_internal_function(
        &mut self,
        params: Vec<ValType>,
        results: Vec<ValType>,
        locals: Vec<ValType>,
        body: Vec<Instruction>,
    ) -> Result<u32, RewriteError> {
        let index = self.module.function_count();
        self.insert_internal_function(index, params, results, locals, body)
    }

    /// Inserts an internal function and registers it in the indirect-call
    /// table, creating the table and an element segment as needed and
    /// widening the table limits. Returns the combined index.
    pub fn insert_indirect_function(
        &mut self,
        index: u32,
        params: Vec<ValType>,
        results: Vec<ValType>,
        locals: Vec<ValType>,
        body: Vec<Instruction>,
    ) -> Result<u32, RewriteError> {
        let index = self.insert_internal_function(index, params, results, locals, body)?;

        let mut elements = ElementRewriter::new(self.module);
        match elements.select(&ElementDesc::default()).first() {
            None => elements.insert(
                None,
                ElementDesc {
                    elem_index: None,
                    table_index: Some(0),
                    offset: Some(1),
                    functions: Some(vec![index]),
                },
            )?,
            Some(first) => {
                let mut functions = first.functions.clone().unwrap_or_default();
                functions.push(index);

                elements.update(
                    &ElementDesc {
                        elem_index: first.elem_index,
                        ..ElementDesc::default()
                    },
                    &ElementDesc {
                        elem_index: None,
                        table_index: None,
                        offset: None,
                        functions: Some(functions),
                    },
                )?
            }
        }

        Ok(index)
    }

    /// Installs a hook: inserts a function at the given combined index and
    /// redirects every `call` of the hooked function to it, leaving the
    /// hooked function itself in place. Returns the hook's combined index.
    pub fn insert_hook_function(
        &mut self,
        hooked: u32,
        index: u32,
        params: Vec<ValType>,
        results: Vec<ValType>,
        locals: Vec<ValType>,
        body: Vec<Instruction>,
    ) -> Result<u32, RewriteError> {
        let index = self.insert_internal_function(index, params, results, locals, body)?;

        // The insertion itself renumbered the hooked function if it sat at or
        // behind the hook's index.
        let target = if hooked >= index { hooked + 1 } else { hooked };
        let imports = self.module.imported_function_count();

        for (offset, code) in self.module.code.iter_mut().enumerate() {
            if offset as u32 + imports == index {
                continue;
            }

            code.body.for_each_mut(&mut |instruction| {
                if instruction.opcode == opcode::CALL && instruction.args == Args::Index(target) {
                    instruction.args = Args::Index(index);
                }
            });
        }

        Ok(index)
    }

    /// The flat body of the function at the given combined index.
    fn flat_body(&mut self, function: u32) -> Result<Vec<Instruction>, RewriteError> {
        let rows = CodeRewriter::new(self.module).select(&CodeDesc::at(function))?;
        let row = rows.into_iter().next().ok_or(RewriteError::NoMatch)?;

        Ok(row.body.unwrap_or_default())
    }

    /// Stores a flat body back into the function at the given combined index.
    fn store_body(&mut self, function: u32, body: Vec<Instruction>) -> Result<(), RewriteError> {
        CodeRewriter::new(self.module).update(
            &CodeDesc::at(function),
            &CodeDesc {
                func_index: None,
                locals: None,
                body: Some(body),
            },
        )
    }

    /// Inserts instructions at a flat-form offset of a function body.
    pub fn insert_func_instructions(
        &mut self,
        function: u32,
        offset: usize,
        instructions: &[Instruction],
    ) -> Result<(), RewriteError> {
        let mut body = self.flat_body(function)?;

        if offset > body.len() {
            return Err(RewriteError::OffsetOutOfBounds(offset));
        }

        body.splice(offset..offset, instructions.iter().cloned());
        self.store_body(function, body)
    }

    /// Appends instructions to a function body.
    pub fn append_func_instructions(
        &mut self,
        function: u32,
        instructions: &[Instruction],
    ) -> Result<(), RewriteError> {
        let mut body = self.flat_body(function)?;
        body.extend(instructions.iter().cloned());
        self.store_body(function, body)
    }

    /// Deletes the instruction at a flat-form offset of a function body.
    pub fn delete_func_instruction(
        &mut self,
        function: u32,
        offset: usize,
    ) -> Result<(), RewriteError> {
        let mut body = self.flat_body(function)?;

        if offset >= body.len() {
            return Err(RewriteError::OffsetOutOfBounds(offset));
        }

        body.remove(offset);
        self.store_body(function, body)
    }

    /// Replaces every occurrence of an instruction in a function body with
    /// the given sequence.
    pub fn modify_func_instructions(
        &mut self,
        function: u32,
        target: &Instruction,
        replacement: &[Instruction],
    ) -> Result<(), RewriteError> {
        let body = self.flat_body(function)?;
        let mut rewritten = Vec::with_capacity(body.len());

        for instruction in body {
            if &instruction == target {
                rewritten.extend(replacement.iter().cloned());
            } else {
                rewritten.push(instruction);
            }
        }

        self.store_body(function, rewritten)
    }

    /// Appends a local to the function at the given combined index.
    pub fn append_func_local(&mut self, function: u32, kind: ValType) -> Result<(), RewriteError> {
        let rows = CodeRewriter::new(self.module).select(&CodeDesc::at(function))?;
        let row = rows.into_iter().next().ok_or(RewriteError::NoMatch)?;

        let mut locals = row.locals.unwrap_or_default();
        locals.push(kind);

        CodeRewriter::new(self.module).update(
            &CodeDesc::at(function),
            &CodeDesc {
                func_index: None,
                locals: Some(locals),
                body: None,
            },
        )
    }

    /// Writes bytes into linear memory at the given offset. A patch that
    /// overlaps an existing active segment merges into it, resizing the
    /// segment where the patch extends past either end; otherwise a new
    /// active segment is appended. Memory limits widen as needed.
    pub fn insert_linear_memory(&mut self, offset: u32, bytes: &[u8]) -> Result<(), RewriteError> {
        self.require_memory()?;

        let patch_start = offset as u64;
        let patch_end = patch_start + bytes.len() as u64;
        let mut merged = false;

        for data in &mut self.module.data {
            let (memory, segment_start) = match &data.mode {
                DataMode::Active(memory, expression) => {
                    match ConstValue::from_expression(expression) {
                        Some(ConstValue::I32(start)) => (*memory, start as u32 as u64),
                        _ => continue,
                    }
                }
                DataMode::Passive => continue,
            };
            let segment_end = segment_start + data.init.len() as u64;

            if patch_start < segment_end && segment_start < patch_end {
                let start = segment_start.min(patch_start);
                let end = segment_end.max(patch_end);

                let mut init = vec![0u8; (end - start) as usize];
                let keep = (segment_start - start) as usize;
                init[keep..keep + data.init.len()].copy_from_slice(&data.init);
                let patch = (patch_start - start) as usize;
                init[patch..patch + bytes.len()].copy_from_slice(bytes);

                data.init = init;
                data.mode =
                    DataMode::Active(memory, ConstValue::I32(start as i32).initializer());
                merged = true;
                break;
            }
        }

        if !merged {
            DataRewriter::new(self.module).insert(
                None,
                DataDesc {
                    data_index: None,
                    offset: Some(offset),
                    init: Some(bytes.to_vec()),
                },
            )?;
        }

        fixer::widen_memory_limits(self.module, patch_end);

        Ok(())
    }

    /// Grows the maximum of memory 0 by the given number of pages.
    pub fn append_linear_memory(&mut self, pages: u32) -> Result<(), RewriteError> {
        let memory = self.module.memories.first_mut().ok_or(RewriteError::NoMemory)?;

        if let Some(max) = memory.max {
            memory.max = Some(max + pages);
        }

        Ok(())
    }

    /// Appends a fresh active segment at the given offset, widening memory
    /// limits as needed.
    pub fn modify_linear_memory(&mut self, offset: u32, bytes: &[u8]) -> Result<(), RewriteError> {
        self.require_memory()?;

        DataRewriter::new(self.module).insert(
            None,
            DataDesc {
                data_index: None,
                offset: Some(offset),
                init: Some(bytes.to_vec()),
            },
        )?;

        fixer::widen_memory_limits(self.module, offset as u64 + bytes.len() as u64);

        Ok(())
    }

    /// Fails unless the module defines or imports a memory.
    fn require_memory(&self) -> Result<(), RewriteError> {
        let imported = self
            .module
            .imports
            .iter()
            .any(|import| matches!(import.desc, crate::model::ImportKind::Memory(_)));

        if self.module.memories.is_empty() && !imported {
            return Err(RewriteError::NoMemory);
        }

        Ok(())
    }

    /// Assigns a name to the given function index, keeping the map sorted.
    pub fn insert_function_name(&mut self, index: u32, name: &str) -> Result<(), RewriteError> {
        self.insert_name(NameKind::Function, index, name)
    }

    /// Renames the given function index.
    pub fn modify_function_name(&mut self, index: u32, name: &str) -> Result<(), RewriteError> {
        NameRewriter::new(self.module, NameKind::Function).update(
            &NameDesc::at(index),
            &NameDesc {
                index: None,
                name: Some(name.to_string()),
            },
        )
    }

    /// Removes the name of the given function index.
    pub fn delete_function_name(&mut self, index: u32) -> Result<(), RewriteError> {
        NameRewriter::new(self.module, NameKind::Function).delete(&NameDesc::at(index))
    }

    /// Assigns a name to the given global index, keeping the map sorted.
    pub fn insert_global_name(&mut self, index: u32, name: &str) -> Result<(), RewriteError> {
        self.insert_name(NameKind::Global, index, name)
    }

    /// Renames the given global index.
    pub fn modify_global_name(&mut self, index: u32, name: &str) -> Result<(), RewriteError> {
        NameRewriter::new(self.module, NameKind::Global).update(
            &NameDesc::at(index),
            &NameDesc {
                index: None,
                name: Some(name.to_string()),
            },
        )
    }

    /// Removes the name of the given global index.
    pub fn delete_global_name(&mut self, index: u32) -> Result<(), RewriteError> {
        NameRewriter::new(self.module, NameKind::Global).delete(&NameDesc::at(index))
    }

    /// Assigns a name to the given data segment index, keeping the map
    /// sorted.
    pub fn insert_data_name(&mut self, index: u32, name: &str) -> Result<(), RewriteError> {
        self.insert_name(NameKind::Data, index, name)
    }

    /// Renames the given data segment index.
    pub fn modify_data_name(&mut self, index: u32, name: &str) -> Result<(), RewriteError> {
        NameRewriter::new(self.module, NameKind::Data).update(
            &NameDesc::at(index),
            &NameDesc {
                index: None,
                name: Some(name.to_string()),
            },
        )
    }

    /// Removes the name of the given data segment index.
    pub fn delete_data_name(&mut self, index: u32) -> Result<(), RewriteError> {
        NameRewriter::new(self.module, NameKind::Data).delete(&NameDesc::at(index))
    }

    /// Inserts into a name map at the position that keeps it sorted by index.
    fn insert_name(
        &mut self,
        kind: NameKind,
        index: u32,
        name: &str,
    ) -> Result<(), RewriteError> {
        let mut rewriter = NameRewriter::new(self.module, kind);
        let position = rewriter
            .select(&NameDesc::default())
            .iter()
            .position(|row| row.index > Some(index));

        let item = NameDesc {
            index: Some(index),
            name: Some(name.to_string()),
        };

        match position {
            Some(position) => {
                let at = rewriter.select(&NameDesc::default())[position].clone();
                rewriter.insert(Some(&at), item)
            }
            None => rewriter.insert(None, item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Code, Expression, FuncType};

    /// A module with three internal functions a, b, c; a calls b.
    fn three_functions() -> Module {
        let mut module = Module::empty();
        module.types.push(FuncType::runnable());

        for _ in 0..3 {
            module.functions.push(0);
            module.code.push(Code::default());
        }

        module.code[0].body = Expression::new(vec![Instruction::call(1)]);
        module
    }

    #[test]
    fn append_global_then_delete() {
        let mut module = Module::empty();
        let mut semantics = SemanticsRewriter::new(&mut module);

        let index = semantics.append_global_variable(ConstValue::I64(7)).unwrap();
        assert_eq!(index, 0);

        semantics.modify_global_variable(0, ConstValue::I64(9)).unwrap();
        assert_eq!(
            ConstValue::from_expression(&module.globals[0].init),
            Some(ConstValue::I64(9))
        );

        SemanticsRewriter::new(&mut module)
            .delete_global_variable(0)
            .unwrap();
        assert!(module.globals.is_empty());
    }

    #[test]
    fn insert_import_reuses_matching_type() {
        let mut module = three_functions();

        let index = SemanticsRewriter::new(&mut module)
            .append_import_function("env", "log", vec![], vec![])
            .unwrap();

        // The () -> () type already existed.
        assert_eq!(module.types.len(), 1);
        // Import ordinal 0; the former call to b (1) now targets 2.
        assert_eq!(index, 0);
        assert_eq!(
            module.code[0].body.instructions(),
            &[Instruction::call(2)]
        );
    }

    #[test]
    fn insert_internal_function_shifts_calls() {
        let mut module = three_functions();

        let index = SemanticsRewriter::new(&mut module)
            .insert_internal_function(
                1,
                vec![ValType::I32],
                vec![],
                vec![],
                vec![Instruction::plain(opcode::NOP)],
            )
            .unwrap();

        assert_eq!(index, 1);
        assert_eq!(module.functions.len(), 4);
        assert_eq!(module.code.len(), 4);
        // a's call to b followed b's renumbering to 2.
        assert_eq!(
            module.code[0].body.instructions(),
            &[Instruction::call(2)]
        );
        // The new signature was appended.
        assert_eq!(module.types.len(), 2);
        assert_eq!(module.functions[1], 1);
    }

    #[test]
    fn hook_redirects_calls() {
        let mut module = three_functions();

        let hook = SemanticsRewriter::new(&mut module)
            .insert_hook_function(1, 3, vec![], vec![], vec![], vec![Instruction::call(1)])
            .unwrap();

        assert_eq!(hook, 3);
        // a's call to b now targets the hook.
        assert_eq!(
            module.code[0].body.instructions(),
            &[Instruction::call(3)]
        );
        // The hook body itself still calls b.
        assert_eq!(
            module.code[3].body.instructions(),
            &[Instruction::call(1)]
        );
    }

    #[test]
    fn hook_at_low_index_follows_renumbering() {
        let mut module = three_functions();

        // Hook function b (index 1) with a hook inserted at index 1: b
        // itself shifts to 2.
        let hook = SemanticsRewriter::new(&mut module)
            .insert_hook_function(1, 1, vec![], vec![], vec![], vec![Instruction::call(2)])
            .unwrap();

        assert_eq!(hook, 1);
        assert_eq!(
            module.code[0].body.instructions(),
            &[Instruction::call(1)]
        );
    }

    #[test]
    fn indirect_function_lands_in_the_table() {
        let mut module = three_functions();

        let index = SemanticsRewriter::new(&mut module)
            .insert_indirect_function(3, vec![], vec![], vec![], vec![])
            .unwrap();

        assert_eq!(index, 3);
        assert_eq!(module.elements.len(), 1);
        assert_eq!(module.elements[0].functions, vec![3]);
        assert!(!module.tables.is_empty());
    }

    #[test]
    fn instruction_edits_through_the_flat_view() {
        let mut module = three_functions();
        let mut semantics = SemanticsRewriter::new(&mut module);

        semantics
            .insert_func_instructions(0, 0, &[Instruction::i32_const(1)])
            .unwrap();
        semantics
            .append_func_instructions(0, &[Instruction::plain(opcode::DROP)])
            .unwrap();

        assert_eq!(
            module.code[0].body.instructions(),
            &[
                Instruction::i32_const(1),
                Instruction::call(1),
                Instruction::plain(opcode::DROP),
            ]
        );

        SemanticsRewriter::new(&mut module)
            .delete_func_instruction(0, 1)
            .unwrap();
        assert_eq!(
            module.code[0].body.instructions(),
            &[Instruction::i32_const(1), Instruction::plain(opcode::DROP)]
        );
    }

    #[test]
    fn instruction_offset_bounds_are_checked() {
        let mut module = three_functions();

        let result =
            SemanticsRewriter::new(&mut module).delete_func_instruction(1, 5);

        assert!(matches!(result, Err(RewriteError::OffsetOutOfBounds(5))));
    }

    #[test]
    fn overlapping_memory_patch_merges() {
        let mut module = Module::empty();
        module.memories.push(crate::model::Limits::bounded(1, 1));
        module.data.push(crate::model::Data::active(
            0,
            ConstValue::I32(100).initializer(),
            (0..10).collect(),
        ));

        SemanticsRewriter::new(&mut module)
            .insert_linear_memory(103, &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE])
            .unwrap();

        assert_eq!(module.data.len(), 1);
        assert_eq!(
            module.data[0].init,
            vec![0, 1, 2, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 8, 9]
        );
    }

    #[test]
    fn memory_patch_extends_past_the_segment() {
        let mut module = Module::empty();
        module.memories.push(crate::model::Limits::bounded(1, 1));
        module.data.push(crate::model::Data::active(
            0,
            ConstValue::I32(100).initializer(),
            vec![1, 2, 3, 4],
        ));

        SemanticsRewriter::new(&mut module)
            .insert_linear_memory(102, &[9, 9, 9, 9])
            .unwrap();

        assert_eq!(module.data[0].init, vec![1, 2, 9, 9, 9, 9]);
    }

    #[test]
    fn disjoint_memory_patch_appends_a_segment() {
        let mut module = Module::empty();
        module.memories.push(crate::model::Limits::bounded(1, 1));
        module.data.push(crate::model::Data::active(
            0,
            ConstValue::I32(100).initializer(),
            vec![1, 2, 3],
        ));

        SemanticsRewriter::new(&mut module)
            .insert_linear_memory(200, &[7])
            .unwrap();

        assert_eq!(module.data.len(), 2);
    }

    #[test]
    fn memory_patch_requires_a_memory() {
        let mut module = Module::empty();

        let result = SemanticsRewriter::new(&mut module).insert_linear_memory(0, &[1]);

        assert!(matches!(result, Err(RewriteError::NoMemory)));
    }

    #[test]
    fn memory_patch_widens_the_maximum() {
        let mut module = Module::empty();
        module.memories.push(crate::model::Limits::bounded(1, 1));

        SemanticsRewriter::new(&mut module)
            .insert_linear_memory(65530, &[0; 16])
            .unwrap();

        assert_eq!(module.memories[0].max, Some(2));
    }

    #[test]
    fn function_names_stay_sorted() {
        let mut module = Module::empty();
        let mut semantics = SemanticsRewriter::new(&mut module);

        semantics.insert_function_name(2, "c").unwrap();
        semantics.insert_function_name(0, "a").unwrap();
        semantics.insert_function_name(1, "b").unwrap();

        let names = module.name_section().unwrap();
        let indices: Vec<u32> = names.functions.iter().map(|assoc| assoc.index).collect();

        assert_eq!(indices, vec![0, 1, 2]);

        SemanticsRewriter::new(&mut module)
            .modify_function_name(0, "entry")
            .unwrap();
        assert_eq!(module.name_section().unwrap().function_name(0), Some("entry"));
    }
}
