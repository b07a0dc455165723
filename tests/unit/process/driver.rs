use super::*;
use crate::foundation::core::ModelShape;

fn fixture() -> (Layout, SceneFrame, Scheduler) {
    let layout = Layout::build(ModelShape { c: 8, t: 4 }, 1);
    (layout, SceneFrame::new(), Scheduler::new())
}

fn disable_all(layout: &mut Layout) {
    for id in layout.cubes().to_vec() {
        layout.block_mut(id).attrs.access_disabled = true;
    }
}

#[test]
fn completed_window_enables_whole_span() {
    let (mut layout, mut scene, mut sched) = fixture();
    let ln = layout.layers[0].ln1;
    disable_all(&mut layout);

    sched.begin_frame(2.0);
    let w = sched.after_time(None, 2.0, 0.0);

    let mut info = start_process_before(&layout, ln.ln_agg1).unwrap();
    process_up_to(&mut layout, &mut scene, &sched, w, ln.ln_agg2, &mut info).unwrap();

    assert!(!layout.block(ln.ln_agg1).attrs.access_disabled);
    assert!(!layout.block(ln.ln_agg2).attrs.access_disabled);
    // Blocks past the target are untouched.
    assert!(layout.block(ln.ln_resid).attrs.access_disabled);
}

#[test]
fn half_progress_reveals_the_frontier_block_per_column() {
    let (mut layout, mut scene, mut sched) = fixture();
    let ln = layout.layers[0].ln1;
    disable_all(&mut layout);

    // Span is lnAgg1 (4 cols) + lnAgg2 (4 cols); at half progress the
    // frontier sits at the start of lnAgg2.
    sched.begin_frame(1.0);
    let w = sched.after_time(None, 2.0, 0.0);

    let mut info = start_process_before(&layout, ln.ln_agg1).unwrap();
    process_up_to(&mut layout, &mut scene, &sched, w, ln.ln_agg2, &mut info).unwrap();

    assert!(!layout.block(ln.ln_agg1).attrs.access_disabled);
    // lnAgg2 itself stays disabled at the block level; only leading cells
    // get enabled once the frontier enters it.
    assert!(layout.block(ln.ln_agg2).attrs.access_disabled);
}

#[test]
fn frontier_cells_accumulate_with_progress() {
    let (mut layout, mut scene, mut sched) = fixture();
    let ln = layout.layers[0].ln1;
    disable_all(&mut layout);

    // 5/8 of the span: one column into lnAgg2.
    sched.begin_frame(1.25);
    let w = sched.after_time(None, 2.0, 0.0);

    let mut info = start_process_before(&layout, ln.ln_agg1).unwrap();
    process_up_to(&mut layout, &mut scene, &sched, w, ln.ln_agg2, &mut info).unwrap();

    let cells = scene.find_sub_blocks(&layout, ln.ln_agg2.into(), Dim::X, 0, 3);
    assert!(!scene.attrs(&layout, cells[0]).access_disabled);
    assert!(!scene.attrs(&layout, cells[1]).access_disabled);
    assert!(scene.attrs(&layout, cells[2]).access_disabled);
    // The frontier column is highlighted.
    assert_eq!(scene.attrs(&layout, cells[1]).highlight, 0.3);
}

#[test]
fn weight_blocks_are_skipped() {
    let (mut layout, mut scene, mut sched) = fixture();
    let ln = layout.layers[0].ln1;
    disable_all(&mut layout);

    sched.begin_frame(100.0);
    let w = sched.after_time(None, 1.0, 0.0);

    let mut info = start_process_before(&layout, layout.residual0).unwrap();
    process_up_to(&mut layout, &mut scene, &sched, w, ln.ln_resid, &mut info).unwrap();

    assert!(!layout.block(ln.ln_resid).attrs.access_disabled);
    assert!(layout.block(ln.ln_mu).attrs.access_disabled);
    assert!(layout.block(ln.ln_sigma).attrs.access_disabled);
}

#[test]
fn cursor_advances_only_after_completion() {
    let (mut layout, mut scene, mut sched) = fixture();
    let ln = layout.layers[0].ln1;

    sched.begin_frame(2.5);
    let w1 = sched.after_time(None, 2.0, 0.0);
    let w2 = sched.after_time(None, 6.0, 0.0);

    let mut info = start_process_before(&layout, ln.ln_agg1).unwrap();
    process_up_to(&mut layout, &mut scene, &sched, w1, ln.ln_agg2, &mut info).unwrap();
    // w1 complete: the second sweep starts after lnAgg2.
    process_up_to(&mut layout, &mut scene, &sched, w2, ln.ln_resid, &mut info).unwrap();

    // A target behind the cursor is a typed error, not a panic.
    let err = process_up_to(&mut layout, &mut scene, &sched, w2, ln.ln_agg1, &mut info)
        .unwrap_err();
    assert!(matches!(err, crate::foundation::error::CuelineError::Process(_)));
}
