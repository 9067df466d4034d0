use super::context::TurnContext;
use crate::error::SimResult;

/// One step of the turn pipeline.
///
/// Object-safe so stages can be stored as `Box<dyn TurnStage>`. Stages run
/// in registration order and communicate only through the world and the
/// report carried by the context.
pub trait TurnStage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut TurnContext) -> SimResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Balance;
    use crate::content::Content;
    use crate::testutil;

    struct Bump;

    impl TurnStage for Bump {
        fn name(&self) -> &'static str {
            "bump"
        }
        fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
            ctx.world.estate.coin += 1;
            Ok(())
        }
    }

    #[test]
    fn stages_are_object_safe() {
        let stages: Vec<Box<dyn TurnStage>> = vec![Box::new(Bump), Box::new(Bump)];
        let mut world = testutil::small_world(1);
        let coin = world.estate.coin;
        let balance = Balance::default();
        let content = Content::standard();
        let mut ctx = TurnContext::new(&mut world, &balance, &content);
        for stage in &stages {
            stage.run(&mut ctx).unwrap();
        }
        assert_eq!(world.estate.coin, coin + 2);
        assert_eq!(stages[0].name(), "bump");
    }
}
