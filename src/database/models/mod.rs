pub mod drink;

pub use drink::{Drink, DrinkLong, DrinkRow, DrinkShort, Ingredient, IngredientShort, NewDrink};
