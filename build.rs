use shadow_rs::ShadowBuilder;

fn main() {
    // Build metadata feeds --version output and the startup banner
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}