use crate::{
    application::{
        numbering::{ExtraGroup, NumberingPlan, question_label},
        registry::RegistryTag,
        render::types::RenderOptions,
    },
    domain::{
        AbAssignment, AbDesign, BenchmarkDesign, MonadicDesign, SectionType, StudyType,
        UnmoderatedDesign, UnmoderatedProtocol, UnmoderatedTask,
    },
};

use super::{
    PageComposer, PartHeader, ScaleVisual, TextStyle, fidelity_row, non_blank, overview,
    protocol_cover, questions, section, split_sections,
};

pub fn compose<C: PageComposer>(
    composer: &mut C,
    protocol: &UnmoderatedProtocol,
    plan: &NumberingPlan,
    options: &RenderOptions,
) {
    let design = protocol.design.test_design();
    let mut rows = vec![("Test design".to_string(), design.label().into_owned())];
    if let UnmoderatedDesign::Ab(ab) = &protocol.design {
        rows.push(("Assignment".to_string(), ab.assignment.label().into_owned()));
    }
    rows.extend(fidelity_row(protocol.fidelity.as_ref()));

    composer.cover(&protocol_cover(
        &protocol.overview,
        StudyType::UnmoderatedUsability,
        rows,
        options,
    ));
    composer.page_break();
    overview(composer, &protocol.overview);

    let (leading, debrief) = split_sections(&protocol.sections);
    for (index, entry) in leading {
        section(composer, entry, plan.section(index));
    }

    match &protocol.design {
        UnmoderatedDesign::Monadic(monadic) => compose_monadic(composer, monadic, plan),
        UnmoderatedDesign::Ab(ab) => compose_ab(composer, ab, plan),
        UnmoderatedDesign::Benchmark(benchmark) => compose_benchmark(composer, benchmark, plan),
    }

    for (index, entry) in debrief {
        section(composer, entry, plan.section(index));
    }
}

fn compose_monadic<C: PageComposer>(
    composer: &mut C,
    monadic: &MonadicDesign,
    plan: &NumberingPlan,
) {
    for (index, task) in monadic.tasks.iter().enumerate() {
        unmoderated_task(composer, format!("Task {}", index + 1), task, plan.task(index));
    }
}

fn compose_ab<C: PageComposer>(composer: &mut C, ab: &AbDesign, plan: &NumberingPlan) {
    let note = match ab.assignment {
        AbAssignment::Within => "Every participant completes the tasks on both variants.",
        AbAssignment::Between => "Each participant is assigned one variant only.",
    };
    composer.callout(&ab.assignment.label(), &[note.to_string()]);

    let mut task_index = 0;
    for variant in &ab.variants {
        composer.heading(&format!("Variant {}", variant.label));
        composer.paragraph(&variant.description, TextStyle::Body);
        if let Some(url) = variant.prototype_url.as_deref().and_then(non_blank) {
            composer.key_values(&[("Prototype".to_string(), url)]);
        }
        for (position, task) in variant.tasks.iter().enumerate() {
            unmoderated_task(
                composer,
                format!("Variant {} \u{00B7} Task {}", variant.label, position + 1),
                task,
                plan.task(task_index),
            );
            task_index += 1;
        }
    }

    if let Some(offset) = plan.extra(ExtraGroup::Comparison)
        && !ab.comparison_questions.is_empty()
    {
        composer.heading("Comparison questions");
        questions(composer, &ab.comparison_questions, offset);
    }
}

fn compose_benchmark<C: PageComposer>(
    composer: &mut C,
    benchmark: &BenchmarkDesign,
    plan: &NumberingPlan,
) {
    let mut task_index = 0;
    for (product_index, product) in benchmark.products.iter().enumerate() {
        composer.page_break();
        composer.heading(&product.name);
        composer.paragraph(&product.description, TextStyle::Body);
        if let Some(url) = product.url.as_deref().and_then(non_blank) {
            composer.key_values(&[("URL".to_string(), url)]);
        }

        for (position, task) in product.tasks.iter().enumerate() {
            unmoderated_task(
                composer,
                format!("{} \u{00B7} Task {}", product.name, position + 1),
                task,
                plan.task(task_index),
            );
            task_index += 1;
        }

        let Some(offset) = plan.extra(ExtraGroup::PostProduct(product_index)) else {
            continue;
        };
        if product.post_product_questions.is_empty() {
            continue;
        }
        composer.heading(&format!("After using {}", product.name));
        for (index, question) in product.post_product_questions.iter().enumerate() {
            let text = match question.instrument.as_deref().and_then(non_blank) {
                Some(instrument) => format!("{} ({instrument})", question.text),
                None => question.text.clone(),
            };
            composer.numbered(&question_label(offset, index), &text);
            composer.scale(&ScaleVisual::likert(
                question.scale_min,
                question.scale_max,
                question.scale_labels.as_ref(),
            ));
        }
    }
}

fn unmoderated_task<C: PageComposer>(
    composer: &mut C,
    label: String,
    task: &UnmoderatedTask,
    offset: usize,
) {
    composer.part_header(
        &PartHeader::new(label, task.title.as_str(), SectionType::Tasks.color())
            .with_duration(task.time_limit_minutes),
    );
    composer.dialogue(&task.instructions);
    composer.key_values(&[("Success criteria".to_string(), task.success_criteria.clone())]);
    questions(composer, &task.follow_up_questions, offset);
}
