use super::*;
use crate::{
    foundation::core::ModelShape,
    narrative::Fragment,
    overlay::OverlayRequest,
    walkthrough::Stage,
};

// Window timeline for this step (all unanchored, so allocation is
// sequential): moveCamera [0,1], hideExtra [2,3], moveInputEmbed [3,4],
// moveCameraClose [4,4.5], focusColumn [4.5,5], calcMu [5,5.5],
// calcVar [5.5,6], cleanAggs [6,6.2], colSequence [6.2,8.2],
// cleanupSplits [8.2,8.7], runAggFull [8.7,10.7], runNormFull [10.7,16.7].

fn stage() -> Stage {
    Stage::new(Layout::build(ModelShape { c: 8, t: 4 }, 2), Phase::LayerNorm)
}

#[test]
fn inactive_phase_is_a_no_op() {
    let mut st = Stage::new(Layout::build(ModelShape { c: 8, t: 4 }, 1), Phase::SelfAttention);
    let report = st.run_frame(5.0);
    assert_eq!(report.process, ProcessStatus::Idle);
    assert!(st.render.overlays.is_empty());
    assert!(st.narrative.paragraphs().is_empty());
    assert_eq!(st.render.camera, crate::scene::camera::Camera::default());
}

#[test]
fn narrative_paragraphs_follow_the_break_structure() {
    let mut st = stage();
    st.run_frame(0.0);
    let segs: Vec<usize> = st.narrative.paragraphs().iter().map(|p| p.segment).collect();
    assert_eq!(segs, vec![0, 2, 4, 6, 8]);
    // The opening paragraph references the input embedding block.
    assert!(st.narrative.paragraphs()[0].fragments.iter().any(|f| matches!(
        f,
        Fragment::BlockRef { block, .. } if *block == st.layout.residual0
    )));
}

#[test]
fn irrelevant_blocks_fade_while_the_input_highlights() {
    let mut st = stage();
    st.run_frame(2.5); // hideExtra at 0.5
    let far_block = st.layout.layers[1].ln1.ln_resid;
    assert_eq!(st.layout.block(far_block).attrs.opacity, 0.5);
    // Within the frame the descent window's write wins (source order).
    assert_eq!(st.layout.block(st.layout.residual0).attrs.highlight, 0.3);
}

#[test]
fn column_focus_splits_and_brightens_the_example_column() {
    let mut st = stage();
    st.run_frame(4.75); // focusColumn at 0.5
    let ln = st.layout.layers[0].ln1;

    assert!((st.layout.block(ln.ln_agg1).attrs.opacity - 0.65).abs() < 1e-12);
    let col = st
        .scene
        .split_grid(&st.layout, ln.ln_agg1.into(), Dim::X, 3.5, 1.0)
        .unwrap();
    assert_eq!(st.scene.attrs(&st.layout, col).opacity, 1.0);
}

#[test]
fn mean_aggregation_issues_dependence_and_flow() {
    let mut st = stage();
    st.run_frame(5.25); // calcMu at 0.5, calcVar pending
    let ln = st.layout.layers[0].ln1;

    let dest = crate::foundation::core::Vec3::new(3.0, 0.0, 0.0);
    assert!(st
        .render
        .overlays
        .contains(&OverlayRequest::Dependence { src: ln.ln_agg1, dest }));
    assert!(st.render.overlays.iter().any(|o| matches!(
        o,
        OverlayRequest::Flow { src, .. } if *src == ln.ln_agg1
    )));
    assert!(!st
        .render
        .overlays
        .iter()
        .any(|o| matches!(o, OverlayRequest::Dependence { src, .. } if *src == ln.ln_agg2)));
}

#[test]
fn cleanup_retracts_aggregation_overlays() {
    let mut st = stage();
    st.run_frame(5.9); // both agg windows active
    assert_eq!(st.render.overlays.len(), 4);

    st.run_frame(6.1); // cleanAggs active, colSequence not yet
    assert!(st.render.overlays.is_empty());
}

#[test]
fn column_sequence_reveals_cells_up_to_the_frontier() {
    let mut st = stage();
    st.run_frame(7.2); // colSequence at 0.5 -> frontier channel 4 of 8
    let ln = st.layout.layers[0].ln1;

    let dest = crate::foundation::core::Vec3::new(3.0, 4.0, 0.0);
    assert!(st
        .render
        .overlays
        .contains(&OverlayRequest::Dependence { src: ln.ln_resid, dest }));

    let resid_col = st
        .scene
        .split_grid(&st.layout, ln.ln_resid.into(), Dim::X, 3.5, 2.0)
        .unwrap();
    let cells = st
        .scene
        .find_sub_blocks(&st.layout, resid_col, Dim::Y, 0, 5);
    for cell in &cells[..=4] {
        assert!(!st.scene.attrs(&st.layout, *cell).access_disabled);
    }
    assert!(st.scene.attrs(&st.layout, cells[5]).access_disabled);
    assert_eq!(st.scene.attrs(&st.layout, cells[4]).highlight, 0.3);
}

#[test]
fn split_retraction_collapses_the_focus_and_the_sequence() {
    let mut st = stage();
    st.run_frame(8.45); // cleanupSplits active, runAggFull pending
    assert!(st.render.overlays.is_empty());
    assert_eq!(st.scene.flatten(&st.layout).len(), st.layout.cubes().len());
}

#[test]
fn fast_forward_reports_ran_and_sweeps_the_aggregates() {
    let mut st = stage();
    let report = st.run_frame(9.7); // runAggFull at 0.5
    let ln = st.layout.layers[0].ln1;

    assert_eq!(report.process, ProcessStatus::Ran);
    assert!(!st.layout.block(ln.ln_agg1).attrs.access_disabled);
    assert!(st.layout.block(ln.ln_resid).attrs.access_disabled);
}

#[test]
fn small_layouts_skip_the_focus_effects() {
    // Example column 3 does not exist in a 2-column layout: the split is a
    // soft miss and the frame still runs.
    let mut st = Stage::new(Layout::build(ModelShape { c: 8, t: 2 }, 1), Phase::LayerNorm);
    st.run_frame(5.25);
    assert!(st.render.overlays.is_empty());
    assert_eq!(st.scene.flatten(&st.layout).len(), st.layout.cubes().len());
}
