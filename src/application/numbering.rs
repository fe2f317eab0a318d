//! Global question numbering.
//!
//! Numbering is a pre-pass over the record: every renderer asks the plan for
//! a group's offset and never keeps its own counter. Groups are visited in a
//! fixed order: non-debrief sections in document order, then task-bound
//! groups in task order, then debrief sections in document order. Tasks are
//! drawn between the two section groups, but a reader meets general
//! questions first and closing questions last, and the numbers follow that.

use crate::domain::{
    AbAssignment, BaseProtocol, Protocol, Section, SurveyProtocol, UnmoderatedDesign,
};

/// Offsets of consecutive groups in one running sequence.
///
/// Each offset is the number of items that precede the group, so item `i` of
/// a group with offset `o` carries identifier `o + i + 1`. Empty groups take
/// no identifiers.
pub fn offsets(group_sizes: &[usize]) -> Vec<usize> {
    group_sizes
        .iter()
        .scan(0usize, |running, &size| {
            let offset = *running;
            *running += size;
            Some(offset)
        })
        .collect()
}

/// Identifier of item `index` in a group starting at `offset`.
pub fn identifier(offset: usize, index: usize) -> usize {
    offset + index + 1
}

/// Question label used by every surface.
pub fn question_label(offset: usize, index: usize) -> String {
    format!("Q{}", identifier(offset, index))
}

/// Task-bound groups whose position in the sequence is fixed by the shape
/// rather than by a task index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraGroup {
    /// A/B comparison questions; present only for within-subjects designs.
    Comparison,
    /// Post-product questions of the benchmark product at this index.
    PostProduct(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupKey {
    Section(usize),
    Task(usize),
    Extra(ExtraGroup),
}

/// Offsets for every numbering group of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberingPlan {
    sections: Vec<usize>,
    tasks: Vec<usize>,
    extras: Vec<(ExtraGroup, usize)>,
    total: usize,
}

impl NumberingPlan {
    pub fn for_protocol(protocol: &Protocol) -> Self {
        match protocol {
            Protocol::ExploratoryInterview(exploratory) => {
                let sections: Vec<(bool, usize)> = exploratory
                    .sections
                    .iter()
                    .map(|entry| {
                        (
                            entry.section.section_type.is_debrief(),
                            entry.section.questions.len() + entry.themes.len(),
                        )
                    })
                    .collect();
                Self::build(&sections, &[])
            }
            Protocol::ModeratedUsability(moderated) => {
                let tasks: Vec<(GroupKey, usize)> = moderated
                    .tasks
                    .iter()
                    .enumerate()
                    .map(|(index, task)| (GroupKey::Task(index), task.post_task_questions.len()))
                    .collect();
                Self::build(&section_sizes(&moderated.sections), &tasks)
            }
            Protocol::UnmoderatedUsability(unmoderated) => {
                let tasks = unmoderated_groups(&unmoderated.design);
                Self::build(&section_sizes(&unmoderated.sections), &tasks)
            }
            Protocol::Survey(survey) => Self::for_survey(survey),
            Protocol::DiaryStudy(base) => Self::for_base(base),
        }
    }

    pub fn for_base(base: &BaseProtocol) -> Self {
        let tasks: Vec<(GroupKey, usize)> = base
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| (GroupKey::Task(index), task.questions.len()))
            .collect();
        Self::build(&section_sizes(&base.sections), &tasks)
    }

    /// Survey blocks are numbered in order; blocks are never debrief.
    pub fn for_survey(survey: &SurveyProtocol) -> Self {
        let blocks: Vec<(bool, usize)> = survey
            .blocks
            .iter()
            .map(|block| (false, block.questions.len()))
            .collect();
        Self::build(&blocks, &[])
    }

    fn build(sections: &[(bool, usize)], task_groups: &[(GroupKey, usize)]) -> Self {
        let mut order: Vec<(GroupKey, usize)> = Vec::with_capacity(sections.len() + task_groups.len());
        order.extend(
            sections
                .iter()
                .enumerate()
                .filter(|(_, (debrief, _))| !debrief)
                .map(|(index, &(_, size))| (GroupKey::Section(index), size)),
        );
        order.extend_from_slice(task_groups);
        order.extend(
            sections
                .iter()
                .enumerate()
                .filter(|(_, (debrief, _))| *debrief)
                .map(|(index, &(_, size))| (GroupKey::Section(index), size)),
        );

        let sizes: Vec<usize> = order.iter().map(|&(_, size)| size).collect();
        let starts = offsets(&sizes);

        let mut plan = NumberingPlan {
            sections: vec![0; sections.len()],
            tasks: Vec::new(),
            extras: Vec::new(),
            total: sizes.iter().sum(),
        };
        for (&(key, _), &offset) in order.iter().zip(&starts) {
            match key {
                GroupKey::Section(index) => plan.sections[index] = offset,
                GroupKey::Task(_) => plan.tasks.push(offset),
                GroupKey::Extra(extra) => plan.extras.push((extra, offset)),
            }
        }
        plan
    }

    /// Offset of the section (or survey block) at `index`.
    pub fn section(&self, index: usize) -> usize {
        self.sections.get(index).copied().unwrap_or(self.total)
    }

    /// Offset of the task at `index`, counting tasks across variants and
    /// products in traversal order.
    pub fn task(&self, index: usize) -> usize {
        self.tasks.get(index).copied().unwrap_or(self.total)
    }

    pub fn extra(&self, group: ExtraGroup) -> Option<usize> {
        self.extras
            .iter()
            .find(|(candidate, _)| *candidate == group)
            .map(|&(_, offset)| offset)
    }

    /// Number of identifiers handed out.
    pub fn total(&self) -> usize {
        self.total
    }
}

fn section_sizes(sections: &[Section]) -> Vec<(bool, usize)> {
    sections
        .iter()
        .map(|section| (section.section_type.is_debrief(), section.questions.len()))
        .collect()
}

fn unmoderated_groups(design: &UnmoderatedDesign) -> Vec<(GroupKey, usize)> {
    let mut groups = Vec::new();
    let mut task_index = 0;
    let mut push_task = |groups: &mut Vec<(GroupKey, usize)>, size: usize| {
        groups.push((GroupKey::Task(task_index), size));
        task_index += 1;
    };

    match design {
        UnmoderatedDesign::Monadic(monadic) => {
            for task in &monadic.tasks {
                push_task(&mut groups, task.follow_up_questions.len());
            }
        }
        UnmoderatedDesign::Ab(ab) => {
            for task in ab.variants.iter().flat_map(|variant| &variant.tasks) {
                push_task(&mut groups, task.follow_up_questions.len());
            }
            if ab.assignment == AbAssignment::Within {
                groups.push((
                    GroupKey::Extra(ExtraGroup::Comparison),
                    ab.comparison_questions.len(),
                ));
            }
        }
        UnmoderatedDesign::Benchmark(benchmark) => {
            for (product_index, product) in benchmark.products.iter().enumerate() {
                for task in &product.tasks {
                    push_task(&mut groups, task.follow_up_questions.len());
                }
                groups.push((
                    GroupKey::Extra(ExtraGroup::PostProduct(product_index)),
                    product.post_product_questions.len(),
                ));
            }
        }
    }
    groups
}
