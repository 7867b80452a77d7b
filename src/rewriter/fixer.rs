//! Index fix-up for structural edits.
//!
//! Inserting or deleting an entity renumbers everything behind it in its
//! index space. The fixers here centralize those cascades: each one takes the
//! pivot index of the edited entity and the direction of the edit, and walks
//! every place in the module where an index of that space is stored,
//! descending uniformly into nested `block`, `loop`, and `if` bodies.

use crate::model::{
    Args, Expression, ExportKind, ImportKind, Limits, Module, NameAssoc, TableType, PAGE_SIZE,
};
use crate::opcode;

/// The direction of a structural edit.
///
/// Insertion shifts every index at or behind the pivot up by one; deletion
/// shifts every index strictly behind the pivot down by one (an index equal
/// to the pivot is a reference to the deleted entity itself and is the
/// caller's problem to reject beforehand).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Shift {
    Insert,
    Delete,
}

impl Shift {
    /// Applies this shift to the given index around the pivot.
    pub fn apply(self, index: &mut u32, pivot: u32) {
        match self {
            Shift::Insert if *index >= pivot => *index += 1,
            Shift::Delete if *index > pivot => *index -= 1,
            _ => {}
        }
    }
}

/// Renumbers every stored function index around the pivot: `call` and
/// `ref.func` immediates in every code body, element-segment function lists,
/// function exports, the start function, and the function name map.
pub fn shift_function_indices(module: &mut Module, pivot: u32, shift: Shift) {
    for code in &mut module.code {
        shift_function_refs(&mut code.body, pivot, shift);
    }

    for element in &mut module.elements {
        for function in &mut element.functions {
            shift.apply(function, pivot);
        }
    }

    for export in &mut module.exports {
        if let ExportKind::Function(index) = &mut export.desc {
            shift.apply(index, pivot);
        }
    }

    if let Some(start) = &mut module.start {
        shift.apply(start, pivot);
    }

    if let Some(names) = module.name_section_mut() {
        shift_name_map(&mut names.functions, pivot, shift);
    }
}

/// Renumbers `call` and `ref.func` immediates within one expression.
pub fn shift_function_refs(body: &mut Expression, pivot: u32, shift: Shift) {
    body.for_each_mut(&mut |instruction| {
        if instruction.opcode == opcode::CALL || instruction.opcode == opcode::REF_FUNC {
            if let Args::Index(index) = &mut instruction.args {
                shift.apply(index, pivot);
            }
        }
    });
}

/// Renumbers every stored type index around the pivot: function-section
/// entries, function-import descriptors, and `call_indirect` immediates.
pub fn shift_type_indices(module: &mut Module, pivot: u32, shift: Shift) {
    for kind in &mut module.functions {
        shift.apply(kind, pivot);
    }

    for import in &mut module.imports {
        if let ImportKind::Function(kind) = &mut import.desc {
            shift.apply(kind, pivot);
        }
    }

    for code in &mut module.code {
        code.body.for_each_mut(&mut |instruction| {
            if instruction.opcode == opcode::CALL_INDIRECT {
                if let Args::Index(index) = &mut instruction.args {
                    shift.apply(index, pivot);
                }
            }
        });
    }
}

/// Renumbers every stored global index around the pivot: `global.get` and
/// `global.set` immediates in code bodies and global initializers, global
/// exports, and the global name map.
pub fn shift_global_indices(module: &mut Module, pivot: u32, shift: Shift) {
    for code in &mut module.code {
        shift_global_refs(&mut code.body, pivot, shift);
    }

    for global in &mut module.globals {
        shift_global_refs(&mut global.init, pivot, shift);
    }

    for export in &mut module.exports {
        if let ExportKind::Global(index) = &mut export.desc {
            shift.apply(index, pivot);
        }
    }

    if let Some(names) = module.name_section_mut() {
        shift_name_map(&mut names.globals, pivot, shift);
    }
}

/// Renumbers `global.get` and `global.set` immediates within one expression.
pub fn shift_global_refs(body: &mut Expression, pivot: u32, shift: Shift) {
    body.for_each_mut(&mut |instruction| {
        if instruction.opcode == opcode::GLOBAL_GET || instruction.opcode == opcode::GLOBAL_SET {
            if let Args::Index(index) = &mut instruction.args {
                shift.apply(index, pivot);
            }
        }
    });
}

/// Renumbers every stored data-segment index around the pivot: `memory.init`
/// and `data.drop` immediates and the data name map.
pub fn shift_data_indices(module: &mut Module, pivot: u32, shift: Shift) {
    for code in &mut module.code {
        code.body.for_each_mut(&mut |instruction| {
            if instruction.opcode == opcode::MEMORY_INIT || instruction.opcode == opcode::DATA_DROP
            {
                if let Args::Index(index) = &mut instruction.args {
                    shift.apply(index, pivot);
                }
            }
        });
    }

    if let Some(names) = module.name_section_mut() {
        shift_name_map(&mut names.data, pivot, shift);
    }
}

/// Renumbers a name map around the pivot. A deletion drops the entry of the
/// deleted entity itself.
fn shift_name_map(map: &mut Vec<NameAssoc>, pivot: u32, shift: Shift) {
    if shift == Shift::Delete {
        map.retain(|assoc| assoc.index != pivot);
    }

    for assoc in map {
        shift.apply(&mut assoc.index, pivot);
    }
}

/// True if any instruction in any code body references the given function
/// index through `call` or `ref.func`.
pub fn function_is_referenced(module: &Module, index: u32) -> bool {
    let mut referenced = false;

    for code in &module.code {
        code.body.for_each(&mut |instruction| {
            if instruction.opcode == opcode::CALL || instruction.opcode == opcode::REF_FUNC {
                referenced |= instruction.index() == Some(index);
            }
        });
    }

    referenced
}

/// True if any instruction in any code body or global initializer references
/// the given global index.
pub fn global_is_referenced(module: &Module, index: u32) -> bool {
    let mut referenced = false;
    let mut check = |instruction: &crate::model::Instruction| {
        if instruction.opcode == opcode::GLOBAL_GET || instruction.opcode == opcode::GLOBAL_SET {
            referenced |= instruction.index() == Some(index);
        }
    };

    for code in &module.code {
        code.body.for_each(&mut check);
    }

    for global in &module.globals {
        global.init.for_each(&mut check);
    }

    referenced
}

/// Ensures table 0 can hold at least `needed` entries, widening its maximum
/// or creating the table outright when the module has none.
pub fn widen_table_limits(module: &mut Module, needed: u32) {
    match module.tables.first_mut() {
        Some(table) => {
            if let Some(max) = table.limits.max {
                if max < needed {
                    table.limits.max = Some(needed);
                }
            }
        }
        None => module
            .tables
            .push(TableType::new(Limits::bounded(needed, needed))),
    }
}

/// Ensures memory 0 can hold a byte at `end - 1`, growing its maximum by
/// whole pages when the written range overflows it.
pub fn widen_memory_limits(module: &mut Module, end: u64) {
    if let Some(memory) = module.memories.first_mut() {
        if let Some(max) = memory.max {
            let capacity = max as u64 * PAGE_SIZE;

            if end > capacity {
                let overflow = end - capacity;
                let pages = (overflow + PAGE_SIZE - 1) / PAGE_SIZE;
                memory.max = Some(max + pages as u32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Code, Export, Instruction, NameSection};

    fn module_with_calls(indices: &[u32]) -> Module {
        let mut module = Module::empty();
        module.code.push(Code::new(
            Vec::new(),
            Expression::new(indices.iter().map(|i| Instruction::call(*i)).collect()),
        ));
        module
    }

    #[test]
    fn insert_shifts_at_and_behind_pivot() {
        let mut module = module_with_calls(&[0, 1, 2]);
        shift_function_indices(&mut module, 1, Shift::Insert);

        let calls: Vec<u32> = module.code[0]
            .body
            .instructions()
            .iter()
            .map(|i| i.index().unwrap())
            .collect();

        assert_eq!(calls, vec![0, 2, 3]);
    }

    #[test]
    fn delete_shifts_strictly_behind_pivot() {
        let mut module = module_with_calls(&[0, 2, 3]);
        shift_function_indices(&mut module, 1, Shift::Delete);

        let calls: Vec<u32> = module.code[0]
            .body
            .instructions()
            .iter()
            .map(|i| i.index().unwrap())
            .collect();

        assert_eq!(calls, vec![0, 1, 2]);
    }

    #[test]
    fn shifts_exports_start_and_elements() {
        let mut module = Module::empty();
        module.exports.push(Export::function("f", 2));
        module.start = Some(3);
        module.elements.push(crate::model::Element::new(
            0,
            Expression::new(vec![Instruction::i32_const(0)]),
            vec![1, 2],
        ));

        shift_function_indices(&mut module, 2, Shift::Insert);

        assert_eq!(module.exports[0].desc, ExportKind::Function(3));
        assert_eq!(module.start, Some(4));
        assert_eq!(module.elements[0].functions, vec![1, 3]);
    }

    #[test]
    fn delete_drops_the_name_entry() {
        let mut module = Module::empty();
        let names = module.name_section_mut_or_insert();
        names.functions.push(NameAssoc::new(0, "keep"));
        names.functions.push(NameAssoc::new(1, "drop"));
        names.functions.push(NameAssoc::new(2, "shift"));

        shift_function_indices(&mut module, 1, Shift::Delete);

        let expected = NameSection {
            functions: vec![NameAssoc::new(0, "keep"), NameAssoc::new(1, "shift")],
            ..NameSection::default()
        };
        assert_eq!(module.name_section(), Some(&expected));
    }

    #[test]
    fn widen_table_creates_missing_table() {
        let mut module = Module::empty();
        widen_table_limits(&mut module, 4);

        assert_eq!(module.tables[0].limits, Limits::bounded(4, 4));

        widen_table_limits(&mut module, 6);
        assert_eq!(module.tables[0].limits.max, Some(6));
    }

    #[test]
    fn widen_memory_grows_by_whole_pages() {
        let mut module = Module::empty();
        module.memories.push(Limits::bounded(1, 1));

        widen_memory_limits(&mut module, PAGE_SIZE + 10);

        assert_eq!(module.memories[0].max, Some(2));
    }

    #[test]
    fn reference_checks() {
        let module = module_with_calls(&[0, 2]);

        assert!(function_is_referenced(&module, 2));
        assert!(!function_is_referenced(&module, 1));
    }
}
